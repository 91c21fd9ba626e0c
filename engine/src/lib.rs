//! Next-map vote engine.
//!
//! Players vote for the next map with short chat commands while a round is
//! running. The engine:
//! - generates the candidate list from the running map and the rule table
//! - keeps one ballot per voter and per-candidate tallies in lockstep
//! - resolves the winner set (ties included) and commits a draw from it
//! - runs the lifecycle: idle → quorum wait → collecting → closed
//!
//! All I/O is behind seams: [`Console`] for outward calls, [`Scheduler`] for
//! timers, [`mapvote_catalog::MapCatalog`] for map lookups and
//! [`mapvote_rules::RuleSource`] for rules.

pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod nomination;
pub mod scheduler;
pub mod session;
pub mod tally;

pub use command::{AdminKind, ChatMessage, Command, QueryKind};
pub use config::VoteConfig;
pub use console::Console;
pub use error::VoteError;
pub use lifecycle::{MapVote, StartOutcome};
pub use nomination::{generate, resolve_rules, Generation, RuleMatch};
pub use scheduler::Scheduler;
pub use session::{AcceptedVote, Standing, VoteSession};
pub use tally::{winners, BallotBox, CastOutcome};
