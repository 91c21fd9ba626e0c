//! Vote rules: which maps are offered after which map.
//!
//! A rule file maps map-name prefixes to lists of candidate rules. When a
//! round starts, the prefix that best matches the running map selects the
//! candidate list; the mandatory `default` entry covers everything else.
//! Mode and version pools may contain the wildcard [`WILDCARD`], resolved
//! against the live map catalog at generation time.

pub mod error;
pub mod source;
pub mod table;

pub use error::RulesError;
pub use source::{FileRuleSource, RuleSource};
pub use table::{CandidateRule, RuleTable, DEFAULT_KEY, VARIANT_PREFIX, WILDCARD};
