//! Event subscribers: the caller side of completion delivery.
//!
//! Each subscriber gets its own unbounded channel. Emitting clones the
//! event into every channel; channels whose receiver was dropped are
//! pruned on the next emit, so forgetting to unsubscribe never leaks.

use std::fmt;

use matchlink_types::SessionEvent;
use tokio::sync::mpsc;

/// Identifies one subscription, for unsubscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A live subscription to a coordinator's events.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Subscription {
    /// Waits for the next event. `None` once the coordinator is gone or
    /// the subscription was removed.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Returns the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        self.events.try_recv().ok()
    }
}

#[derive(Debug, Default)]
pub(crate) struct EventSubscribers {
    next_id: u64,
    senders: Vec<(SubscriptionId, mpsc::UnboundedSender<SessionEvent>)>,
}

impl EventSubscribers {
    pub(crate) fn subscribe(&mut self) -> Subscription {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.push((id, tx));
        Subscription { id, events: rx }
    }

    /// Returns `false` if `id` was not subscribed.
    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.senders.len();
        self.senders.retain(|(sub, _)| *sub != id);
        self.senders.len() != before
    }

    pub(crate) fn emit(&mut self, event: SessionEvent) {
        tracing::trace!(?event, subscribers = self.senders.len(), "emitting event");
        self.senders.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}
