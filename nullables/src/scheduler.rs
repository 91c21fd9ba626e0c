//! Nullable scheduler: timers on a virtual clock.

use mapvote_engine::Scheduler;
use mapvote_types::TimerId;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Pending {
    due: Duration,
    interval: Option<Duration>,
}

#[derive(Default)]
struct Inner {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerId, Pending>,
}

/// A deterministic scheduler for testing.
///
/// Time only advances when you tell it to; [`ManualScheduler::advance`]
/// returns the ids that fired, in firing order, for the test to feed back
/// into the engine.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<Inner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.inner.lock().unwrap().now
    }

    /// Move the clock forward by `by`, firing everything that falls due.
    /// Repeating timers may fire several times.
    pub fn advance(&self, by: Duration) -> Vec<TimerId> {
        let mut inner = self.inner.lock().unwrap();
        let target = inner.now + by;
        let mut fired = Vec::new();

        loop {
            let next = inner
                .timers
                .iter()
                .filter(|(_, pending)| pending.due <= target)
                .min_by_key(|(id, pending)| (pending.due, **id))
                .map(|(id, pending)| (*id, pending.due));
            let Some((id, due)) = next else { break };

            inner.now = due;
            fired.push(id);
            let reschedule = inner.timers.get(&id).and_then(|pending| pending.interval);
            match reschedule {
                Some(interval) => {
                    if let Some(pending) = inner.timers.get_mut(&id) {
                        pending.due = due + interval;
                    }
                }
                None => {
                    inner.timers.remove(&id);
                }
            }
        }

        inner.now = target;
        fired
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.inner.lock().unwrap().timers.contains_key(&id)
    }

    /// Number of live timers.
    pub fn pending(&self) -> usize {
        self.inner.lock().unwrap().timers.len()
    }

    fn insert(&self, delay: Duration, interval: Option<Duration>) -> TimerId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = TimerId::new(inner.next_id);
        let due = inner.now + delay;
        inner.timers.insert(id, Pending { due, interval });
        id
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration) -> TimerId {
        self.insert(delay, None)
    }

    fn schedule_repeating(&self, interval: Duration) -> TimerId {
        self.insert(interval, Some(interval))
    }

    fn cancel(&self, id: TimerId) {
        self.inner.lock().unwrap().timers.remove(&id);
    }
}
