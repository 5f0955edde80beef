//! Invite state machine
//!
//! Invites are only ever stored while pending. Both exits are terminal and
//! remove the row, so there is no way back to `Pending`.

use fellowship_common::StateError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteState {
    Pending,
    Accepted,
    Denied,
}

impl InviteState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Denied)
    }
}

impl std::fmt::Display for InviteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// Events that trigger invite state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteEvent {
    /// Recipient accepts; a member is created
    Accept,
    /// Recipient denies
    Deny,
}

impl std::fmt::Display for InviteEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

pub struct InviteStateMachine;

impl InviteStateMachine {
    /// Attempt a state transition
    pub fn transition(current: InviteState, event: InviteEvent) -> Result<InviteState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        match (current, event) {
            (InviteState::Pending, InviteEvent::Accept) => Ok(InviteState::Accepted),
            (InviteState::Pending, InviteEvent::Deny) => Ok(InviteState::Denied),
            _ => Err(StateError::InvalidTransition {
                from: current.to_string(),
                event: event.to_string(),
            }),
        }
    }
}
