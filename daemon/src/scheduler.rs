//! Tokio-backed scheduler: each timer is a task that posts its id back into
//! the dispatch loop.

use crate::event::LoopEvent;
use mapvote_engine::Scheduler;
use mapvote_types::TimerId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

/// Must be used from inside a tokio runtime.
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<LoopEvent>,
    next_id: AtomicU64,
    tasks: Mutex<HashMap<TimerId, JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<LoopEvent>) -> Self {
        Self {
            events,
            next_id: AtomicU64::new(1),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    fn track(&self, id: TimerId, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        tasks.retain(|_, task| !task.is_finished());
        tasks.insert(id, handle);
    }

    fn next_id(&self) -> TimerId {
        TimerId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration) -> TimerId {
        let id = self.next_id();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let _ = events.send(LoopEvent::Timer(id));
        });
        self.track(id, handle);
        id
    }

    fn schedule_repeating(&self, interval: Duration) -> TimerId {
        let id = self.next_id();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + interval, interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if events.send(LoopEvent::Timer(id)).is_err() {
                    break;
                }
            }
        });
        self.track(id, handle);
        id
    }

    fn cancel(&self, id: TimerId) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(task) = tasks.remove(&id) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(|p| p.into_inner());
        for (_, task) in tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn one_shot_posts_its_id() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(tx);
        let id = scheduler.schedule_once(TICK);
        assert_eq!(rx.recv().await, Some(LoopEvent::Timer(id)));
    }

    #[tokio::test]
    async fn repeating_posts_until_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(tx);
        let id = scheduler.schedule_repeating(TICK);
        assert_eq!(rx.recv().await, Some(LoopEvent::Timer(id)));
        assert_eq!(rx.recv().await, Some(LoopEvent::Timer(id)));

        scheduler.cancel(id);
        // drain anything already queued, then nothing more arrives
        while rx.try_recv().is_ok() {}
        sleep(TICK * 5).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancelled_one_shot_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(tx);
        let id = scheduler.schedule_once(TICK * 2);
        scheduler.cancel(id);
        sleep(TICK * 5).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(tx);
        let a = scheduler.schedule_once(Duration::from_secs(60));
        let b = scheduler.schedule_repeating(Duration::from_secs(60));
        assert_ne!(a, b);
    }
}
