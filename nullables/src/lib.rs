//! Nullable infrastructure for deterministic testing.
//!
//! Every seam the vote engine talks through (console, scheduler, rule
//! source) has a test implementation here that:
//! - records what the engine asked for instead of doing it
//! - can be inspected and driven programmatically after being handed over
//! - never touches the filesystem, the network or the wall clock
//!
//! Each type is a cheap handle: clone it, give one clone to the engine and
//! keep the other for assertions.

pub mod console;
pub mod rules;
pub mod scheduler;

pub use console::{ConsoleCall, NullConsole};
pub use rules::StaticRuleSource;
pub use scheduler::ManualScheduler;
