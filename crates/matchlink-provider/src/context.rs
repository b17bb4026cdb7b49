//! The local-user context: who is at the keyboard, and can they travel.
//!
//! In a game this is the world plus its first local player and player
//! controller. The coordinator only asks three questions, so the trait
//! has three methods.

use matchlink_types::LocalUser;

/// Execution context a coordinator checks before issuing operations.
pub trait LocalUserContext: Send + 'static {
    /// `false` while there is no active world/context to act in.
    fn is_valid(&self) -> bool;

    /// The local user operations are issued for, if one is signed in.
    fn local_user(&self) -> Option<LocalUser>;

    /// `true` if a local controller exists that can follow a travel
    /// directive.
    fn can_travel(&self) -> bool;
}

/// A context with fixed answers.
///
/// Good enough for dedicated tools, demos, and tests. Mutate the public
/// fields to simulate sign-out or a torn-down world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticContext {
    pub valid: bool,
    pub user: Option<LocalUser>,
    pub can_travel: bool,
}

impl StaticContext {
    /// A valid context with `user` signed in and able to travel.
    pub fn signed_in(user: LocalUser) -> Self {
        Self {
            valid: true,
            user: Some(user),
            can_travel: true,
        }
    }

    /// A valid context with nobody signed in.
    pub fn signed_out() -> Self {
        Self {
            valid: true,
            user: None,
            can_travel: false,
        }
    }

    /// No active context at all.
    pub fn invalid() -> Self {
        Self {
            valid: false,
            user: None,
            can_travel: false,
        }
    }
}

impl LocalUserContext for StaticContext {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn local_user(&self) -> Option<LocalUser> {
        self.user.clone()
    }

    fn can_travel(&self) -> bool {
        self.valid && self.can_travel
    }
}
