//! Where rule tables come from.

use crate::error::RulesError;
use crate::table::RuleTable;
use std::path::{Path, PathBuf};

/// Loads a fresh [`RuleTable`] on demand (at startup and on admin reload).
pub trait RuleSource: Send {
    fn load(&self) -> Result<RuleTable, RulesError>;

    /// Short description for log lines, e.g. the file path.
    fn describe(&self) -> String;
}

/// Reads the JSON rule file from disk on every load.
#[derive(Clone, Debug)]
pub struct FileRuleSource {
    path: PathBuf,
}

impl FileRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleSource for FileRuleSource {
    fn load(&self) -> Result<RuleTable, RulesError> {
        tracing::info!(path = %self.path.display(), "fetching map vote rules");
        let content = std::fs::read_to_string(&self.path).map_err(|source| RulesError::Io {
            path: self.path.clone(),
            source,
        })?;
        RuleTable::from_json_str(&content)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
