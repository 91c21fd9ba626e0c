//! Nullable rule source: serves an in-memory table.

use mapvote_rules::{RuleSource, RuleTable, RulesError};
use std::io;
use std::sync::{Arc, Mutex};

/// Serves a fixed [`RuleTable`], or fails like a missing file.
///
/// The table can be swapped after handing the source to the engine, to
/// exercise reloads.
#[derive(Clone, Default)]
pub struct StaticRuleSource {
    table: Arc<Mutex<Option<RuleTable>>>,
}

impl StaticRuleSource {
    pub fn new(table: RuleTable) -> Self {
        Self {
            table: Arc::new(Mutex::new(Some(table))),
        }
    }

    /// Parse `json` in the rule file format.
    ///
    /// # Panics
    /// Panics if `json` is not a valid rule file.
    pub fn from_json(json: &str) -> Self {
        Self::new(RuleTable::from_json_str(json).expect("test rules must be valid"))
    }

    /// A source whose every load fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Serve `table` from the next load on; `None` makes loads fail.
    pub fn set(&self, table: Option<RuleTable>) {
        *self.table.lock().unwrap() = table;
    }
}

impl RuleSource for StaticRuleSource {
    fn load(&self) -> Result<RuleTable, RulesError> {
        self.table
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RulesError::Io {
                path: "<static>".into(),
                source: io::Error::new(io::ErrorKind::NotFound, "no rules configured"),
            })
    }

    fn describe(&self) -> String {
        "<static>".to_string()
    }
}
