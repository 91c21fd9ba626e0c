//! Console implementation writing remote-console calls as JSON lines.

use mapvote_engine::Console;
use mapvote_types::{MapId, VoterId};
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

/// One outward call, serialised for the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundCall<'a> {
    Broadcast { text: &'a str },
    Warn { player: &'a VoterId, text: &'a str },
    SetNextLayer { layer: &'a MapId },
}

/// Writes each call as one JSON line. Write failures are logged and dropped.
pub struct LineConsole<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> LineConsole<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, call: &OutboundCall<'_>) {
        let Ok(mut out) = self.out.lock() else {
            tracing::warn!("console writer poisoned; dropping call");
            return;
        };
        let result = serde_json::to_writer(&mut *out, call)
            .map_err(std::io::Error::from)
            .and_then(|()| out.write_all(b"\n"))
            .and_then(|()| out.flush());
        if let Err(e) = result {
            tracing::warn!("failed to write console call: {e}");
        }
    }
}

impl<W: Write + Send> Console for LineConsole<W> {
    fn broadcast(&self, text: &str) {
        self.emit(&OutboundCall::Broadcast { text });
    }

    fn warn(&self, voter: &VoterId, text: &str) {
        self.emit(&OutboundCall::Warn {
            player: voter,
            text,
        });
    }

    fn set_next_map(&self, map: &MapId) {
        tracing::info!(layer = %map, "setting next layer");
        self.emit(&OutboundCall::SetNextLayer { layer: map });
    }
}
