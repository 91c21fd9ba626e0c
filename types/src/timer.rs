//! Timer handles handed out by a scheduler.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle identifying one scheduled timer.
///
/// Ids are never reused by a scheduler, so a tick carrying an id that the
/// lifecycle no longer owns is recognisably stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}
