//! Nullable console: record outward calls without sending them.

use mapvote_engine::Console;
use mapvote_types::{MapId, VoterId};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCall {
    Broadcast(String),
    Warn { voter: VoterId, text: String },
    SetNextMap(MapId),
}

/// A console that records every call for later assertions.
#[derive(Clone, Default)]
pub struct NullConsole {
    calls: Arc<Mutex<Vec<ConsoleCall>>>,
}

impl NullConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<ConsoleCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ConsoleCall::Broadcast(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Direct messages sent to `voter`, oldest first.
    pub fn warnings_to(&self, voter: &VoterId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ConsoleCall::Warn { voter: to, text } if &to == voter => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn next_maps(&self) -> Vec<MapId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ConsoleCall::SetNextMap(map) => Some(map),
                _ => None,
            })
            .collect()
    }

    pub fn last_next_map(&self) -> Option<MapId> {
        self.next_maps().pop()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: ConsoleCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Console for NullConsole {
    fn broadcast(&self, text: &str) {
        self.record(ConsoleCall::Broadcast(text.to_string()));
    }

    fn warn(&self, voter: &VoterId, text: &str) {
        self.record(ConsoleCall::Warn {
            voter: voter.clone(),
            text: text.to_string(),
        });
    }

    fn set_next_map(&self, map: &MapId) {
        self.record(ConsoleCall::SetNextMap(map.clone()));
    }
}
