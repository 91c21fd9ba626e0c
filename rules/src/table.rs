//! The validated rule table.

use crate::error::RulesError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pool entry meaning "any value the catalog has".
pub const WILDCARD: &str = "Any";

/// Variant marker that may lead a version (e.g. `CAF_v1`) and a map id.
pub const VARIANT_PREFIX: &str = "CAF_";

/// Key of the mandatory fallback entry in the rule file.
pub const DEFAULT_KEY: &str = "default";

/// One candidate slot: a map plus the modes and versions it may be offered in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRule {
    #[serde(rename = "map")]
    pub map_name: String,
    pub modes: Vec<String>,
    pub versions: Vec<String>,
}

impl CandidateRule {
    pub fn new(
        map_name: impl Into<String>,
        modes: impl IntoIterator<Item = impl Into<String>>,
        versions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            map_name: map_name.into(),
            modes: modes.into_iter().map(Into::into).collect(),
            versions: versions.into_iter().map(Into::into).collect(),
        }
    }

    fn validate(&self, key: &str) -> Result<(), RulesError> {
        if self.map_name.trim().is_empty() {
            return Err(RulesError::EmptyMapName {
                key: key.to_string(),
            });
        }
        for (pool, values) in [("modes", &self.modes), ("versions", &self.versions)] {
            if values.is_empty() {
                return Err(RulesError::EmptyPool {
                    key: key.to_string(),
                    map: self.map_name.clone(),
                    pool,
                });
            }
        }
        Ok(())
    }
}

/// On-disk shape of a rule file.
#[derive(Deserialize)]
struct RuleFile {
    rules: HashMap<String, Vec<CandidateRule>>,
    #[serde(default)]
    modes: Vec<String>,
}

/// Immutable, validated view of the loaded vote rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: HashMap<String, Vec<CandidateRule>>,
    default: Vec<CandidateRule>,
    modes: Vec<String>,
}

impl RuleTable {
    /// Build a table, validating every entry.
    ///
    /// Duplicate modes are dropped, keeping first occurrence order.
    pub fn new(
        rules: HashMap<String, Vec<CandidateRule>>,
        default: Vec<CandidateRule>,
        modes: Vec<String>,
    ) -> Result<Self, RulesError> {
        for rule in &default {
            rule.validate(DEFAULT_KEY)?;
        }
        for (key, list) in &rules {
            for rule in list {
                rule.validate(key)?;
            }
        }

        let mut unique_modes: Vec<String> = Vec::with_capacity(modes.len());
        for mode in modes {
            if !unique_modes.contains(&mode) {
                unique_modes.push(mode);
            }
        }

        Ok(Self {
            rules,
            default,
            modes: unique_modes,
        })
    }

    /// A table with no rules at all. Generation against it yields nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and validate the JSON rule file format:
    ///
    /// ```json
    /// { "rules": { "default": [{"map": "Narva", "modes": ["Any"], "versions": ["v1"]}] },
    ///   "modes": ["RAAS", "Invasion"] }
    /// ```
    pub fn from_json_str(s: &str) -> Result<Self, RulesError> {
        let RuleFile { mut rules, modes } = serde_json::from_str(s)?;
        let default = rules.remove(DEFAULT_KEY).ok_or(RulesError::MissingDefault)?;
        Self::new(rules, default, modes)
    }

    /// Candidate list registered for exactly `prefix`, if any.
    pub fn get(&self, prefix: &str) -> Option<&[CandidateRule]> {
        self.rules.get(prefix).map(Vec::as_slice)
    }

    pub fn default_rules(&self) -> &[CandidateRule] {
        &self.default
    }

    /// Pool used to resolve a wildcard mode.
    pub fn modes(&self) -> &[String] {
        &self.modes
    }

    /// Number of prefix entries, excluding `default`.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.default.is_empty()
    }
}
