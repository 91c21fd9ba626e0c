//! Lifecycle state of a vote session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the current round's vote is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Fresh session; waiting for the round-start delay or an admin restart.
    #[default]
    Idle,
    /// A start was attempted below the player minimum; every join re-checks.
    AwaitingQuorum,
    /// Nominations are published and ballots are accepted.
    Collecting,
    /// Cancelled by an admin, ended by a new round, or failed to open.
    Closed,
}

impl LifecycleState {
    /// Whether ballots are currently accepted.
    pub fn is_collecting(&self) -> bool {
        matches!(self, Self::Collecting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingQuorum => "awaiting_quorum",
            Self::Collecting => "collecting",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
