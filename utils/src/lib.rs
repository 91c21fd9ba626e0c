//! Shared utilities for the map vote engine.

pub mod logging;
pub mod stats;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use stats::{VoteStat, VoteStats};
pub use time::format_duration;
