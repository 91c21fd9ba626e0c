//! Map (layer) identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A map identifier as known to the game server, e.g. `Narva_Invasion_v1`
/// or `CAF_Narva_Invasion_v1`.
///
/// Identifiers are `_`-delimited: an optional variant prefix, the map name,
/// the game mode and finally the version.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(String);

impl MapId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The trailing `_`-delimited segment (the version), if any.
    pub fn version_suffix(&self) -> Option<&str> {
        self.0.rsplit_once('_').map(|(_, version)| version)
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MapId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MapId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for MapId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
