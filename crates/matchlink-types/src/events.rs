//! Completion envelopes (backend → coordinator) and session events
//! (coordinator → caller).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CompletionHandle, SearchResultSet, SessionName};

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// The asynchronous operations a coordinator tracks.
///
/// At most one operation of each kind is in flight at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Create,
    Find,
    Join,
    Start,
    Destroy,
}

impl OperationKind {
    /// Every kind, in a fixed order.
    pub const ALL: [OperationKind; 5] = [
        Self::Create,
        Self::Find,
        Self::Join,
        Self::Start,
        Self::Destroy,
    ];
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Find => write!(f, "find"),
            Self::Join => write!(f, "join"),
            Self::Start => write!(f, "start"),
            Self::Destroy => write!(f, "destroy"),
        }
    }
}

// ---------------------------------------------------------------------------
// JoinResult
// ---------------------------------------------------------------------------

/// Outcome code of a join attempt.
///
/// Join failures are reported with their code instead of a plain
/// `false`, so the caller can tell "full" from "gone".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinResult {
    Success,
    AlreadyInSession,
    NoSession,
    SessionIsFull,
    SessionDoesNotMatch,
    CouldNotRetrieveAddress,
    UnknownError,
}

impl JoinResult {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for JoinResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "Success",
            Self::AlreadyInSession => "AlreadyInSession",
            Self::NoSession => "NoSession",
            Self::SessionIsFull => "SessionIsFull",
            Self::SessionDoesNotMatch => "SessionDoesNotMatch",
            Self::CouldNotRetrieveAddress => "CouldNotRetrieveAddress",
            Self::UnknownError => "UnknownError",
        };
        f.write_str(text)
    }
}

// ---------------------------------------------------------------------------
// Provider completions
// ---------------------------------------------------------------------------

/// What the backend reports when an operation finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Create {
        session_name: SessionName,
        success: bool,
    },
    Find {
        success: bool,
        results: SearchResultSet,
    },
    Join {
        session_name: SessionName,
        result: JoinResult,
    },
    Start {
        session_name: SessionName,
        success: bool,
    },
    Destroy {
        session_name: SessionName,
        success: bool,
    },
}

impl CompletionOutcome {
    /// The operation kind this outcome answers.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Find { .. } => OperationKind::Find,
            Self::Join { .. } => OperationKind::Join,
            Self::Start { .. } => OperationKind::Start,
            Self::Destroy { .. } => OperationKind::Destroy,
        }
    }
}

/// A completion delivered to the listener identified by `handle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCompletion {
    pub handle: CompletionHandle,
    pub outcome: CompletionOutcome,
}

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// Events a coordinator emits to its subscribers.
///
/// Every accepted or rejected operation ends in exactly one completion
/// event of its kind. A successful join may be followed by a
/// `TravelRequested` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    CreateCompleted { success: bool },

    /// `results` is empty whenever `success` is `false`.
    FindCompleted {
        results: SearchResultSet,
        success: bool,
    },

    JoinCompleted { result: JoinResult },

    /// The caller should move the local client to `address`.
    TravelRequested { address: String },

    StartCompleted { success: bool },

    DestroyCompleted { success: bool },
}

impl SessionEvent {
    /// The failure event for an operation of `kind`.
    pub fn failure(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Create => Self::CreateCompleted { success: false },
            OperationKind::Find => Self::FindCompleted {
                results: SearchResultSet::default(),
                success: false,
            },
            OperationKind::Join => Self::JoinCompleted {
                result: JoinResult::UnknownError,
            },
            OperationKind::Start => Self::StartCompleted { success: false },
            OperationKind::Destroy => Self::DestroyCompleted { success: false },
        }
    }
}
