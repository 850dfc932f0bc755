//! Conversation session state machine with an explicit transition table.
//!
//! ```text
//! Uninitialized --Mount--> AvatarLoading --AvatarLoaded--> Ready <--> Exchanging
//!                                        --AvatarFailed--> Unavailable
//! (any live state) --Teardown--> Closed
//! ```

use std::fmt;

/// Lifecycle state of one widget session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Uninitialized,
    AvatarLoading,
    /// Accepting input. Whether a conversation exists yet is tracked
    /// separately by the session's conversation id.
    Ready,
    Exchanging,
    /// Terminal for this mount: the avatar could not be loaded.
    Unavailable,
    /// Torn down. Late responses are ignored.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::AvatarLoading => write!(f, "avatar_loading"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Exchanging => write!(f, "exchanging"),
            SessionState::Unavailable => write!(f, "unavailable"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// Inputs that drive the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    Mount,
    AvatarLoaded,
    AvatarFailed,
    Submit,
    ExchangeSucceeded,
    ExchangeFailed,
    Teardown,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Mount => write!(f, "mount"),
            SessionEvent::AvatarLoaded => write!(f, "avatar_loaded"),
            SessionEvent::AvatarFailed => write!(f, "avatar_failed"),
            SessionEvent::Submit => write!(f, "submit"),
            SessionEvent::ExchangeSucceeded => write!(f, "exchange_succeeded"),
            SessionEvent::ExchangeFailed => write!(f, "exchange_failed"),
            SessionEvent::Teardown => write!(f, "teardown"),
        }
    }
}

/// Look up the state reached by applying `event` in state `from`.
///
/// Returns `None` when the pair is not in the table; callers ignore such
/// events instead of guessing.
pub fn transition(from: SessionState, event: SessionEvent) -> Option<SessionState> {
    use SessionEvent as E;
    use SessionState as S;

    match (from, event) {
        (S::Uninitialized, E::Mount) => Some(S::AvatarLoading),
        (S::AvatarLoading, E::AvatarLoaded) => Some(S::Ready),
        (S::AvatarLoading, E::AvatarFailed) => Some(S::Unavailable),
        (S::Ready, E::Submit) => Some(S::Exchanging),
        (S::Exchanging, E::ExchangeSucceeded) => Some(S::Ready),
        (S::Exchanging, E::ExchangeFailed) => Some(S::Ready),
        (S::Closed, E::Teardown) => None,
        (_, E::Teardown) => Some(S::Closed),
        _ => None,
    }
}
