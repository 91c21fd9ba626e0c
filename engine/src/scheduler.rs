//! Deferred work: the round-start delay and the periodic broadcast.
//!
//! The engine never sleeps. It asks a [`Scheduler`] for timers and is later
//! handed the fired [`TimerId`] through `MapVote::on_timer`, on the same
//! event stream as every other input.

use mapvote_types::TimerId;
use std::time::Duration;

pub trait Scheduler: Send {
    /// Fire once after `delay`.
    fn schedule_once(&self, delay: Duration) -> TimerId;

    /// Fire every `interval` until cancelled. The first tick is one
    /// interval from now.
    fn schedule_repeating(&self, interval: Duration) -> TimerId;

    /// Stop `id`. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);
}
