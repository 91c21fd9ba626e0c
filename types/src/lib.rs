//! Fundamental types for the map vote engine.
//!
//! This crate defines the identifiers shared across every other crate in the
//! workspace: voters, map identifiers, timer handles, and the lifecycle state.

pub mod map;
pub mod state;
pub mod timer;
pub mod voter;

pub use map::MapId;
pub use state::LifecycleState;
pub use timer::TimerId;
pub use voter::VoterId;
