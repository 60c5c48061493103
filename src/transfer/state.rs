//! Transfer Attempt State Machine
//!
//! Defines the FSM states, events, and transition function for one transfer
//! attempt.

use serde::{Deserialize, Serialize};

/// Transfer attempt FSM states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptState {
    /// No attempt running
    Idle,
    /// Checking preconditions and converting the amount
    Validating,
    /// Waiting for the service to build the user operation
    Building,
    /// Waiting for the wallet signature
    Signing,
    /// Waiting for the service to accept the signed operation
    Submitting,
    /// Attempt finished with a transaction hash ✅
    Succeeded,
    /// Attempt aborted at some step ❌
    Failed,
}

impl AttemptState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptState::Idle => "idle",
            AttemptState::Validating => "validating",
            AttemptState::Building => "building",
            AttemptState::Signing => "signing",
            AttemptState::Submitting => "submitting",
            AttemptState::Succeeded => "succeeded",
            AttemptState::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(AttemptState::Idle),
            "validating" => Some(AttemptState::Validating),
            "building" => Some(AttemptState::Building),
            "signing" => Some(AttemptState::Signing),
            "submitting" => Some(AttemptState::Submitting),
            "succeeded" => Some(AttemptState::Succeeded),
            "failed" => Some(AttemptState::Failed),
            _ => None,
        }
    }

    /// Check if this is a terminal state (the attempt is over)
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Succeeded | AttemptState::Failed)
    }

    /// Check if a new attempt may start from this state
    pub fn can_start_attempt(&self) -> bool {
        matches!(self, AttemptState::Idle) || self.is_terminal()
    }
}

/// FSM Events (inputs that trigger state transitions)
#[derive(Debug, Clone)]
pub enum AttemptEvent {
    /// New attempt started
    Start,
    /// Preconditions held and the amount converted
    Validated,
    /// Service returned a message to sign
    Built,
    /// Wallet produced a signature
    Signed,
    /// Service accepted the signed operation
    Submitted,
    /// Any step failed
    Fault,
}

/// State transition function
///
/// Given the current state and an event, returns the next state.
/// Invalid transitions return the current state (no change).
pub fn transition(current: AttemptState, event: AttemptEvent) -> AttemptState {
    use AttemptEvent::*;
    use AttemptState::*;

    match (current, event) {
        // A new attempt may start from Idle or either terminal state
        (Idle, Start) | (Succeeded, Start) | (Failed, Start) => Validating,

        // Happy path, strictly sequential
        (Validating, Validated) => Building,
        (Building, Built) => Signing,
        (Signing, Signed) => Submitting,
        (Submitting, Submitted) => Succeeded,

        // Any in-flight step may fault
        (Validating, Fault) | (Building, Fault) | (Signing, Fault) | (Submitting, Fault) => Failed,

        // Invalid transitions - stay in current state
        _ => current,
    }
}
