use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("could not read vote rules at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed vote rules: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("vote rules have no \"default\" entry")]
    MissingDefault,

    #[error("rule \"{key}\" has an entry with an empty map name")]
    EmptyMapName { key: String },

    #[error("rule \"{key}\" entry for {map} has an empty {pool} pool")]
    EmptyPool {
        key: String,
        map: String,
        pool: &'static str,
    },
}
