//! Voter identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a player who may hold a ballot (e.g. a Steam ID).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(String);

impl VoterId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VoterId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VoterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
