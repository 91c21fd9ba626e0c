//! Events consumed by the daemon's single dispatch loop.

use mapvote_types::{MapId, TimerId, VoterId};
use serde::{Deserialize, Serialize};

/// One line of input from the game server transport.
///
/// ```json
/// {"type": "new_game", "map": "Narva_Invasion_v1"}
/// {"type": "chat", "player": "76561198000000000", "name": "bob", "message": "!vote 2", "admin": false}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    NewGame {
        map: MapId,
    },
    PlayerConnected {
        player: VoterId,
    },
    PlayerDisconnected {
        player: VoterId,
    },
    /// Full roster snapshot.
    Players {
        players: Vec<VoterId>,
    },
    Chat {
        player: VoterId,
        #[serde(default)]
        name: String,
        message: String,
        #[serde(default)]
        admin: bool,
    },
}

/// Everything the dispatch loop reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoopEvent {
    Inbound(InboundEvent),
    Timer(TimerId),
    /// The transport reached end of input.
    InputClosed,
    Shutdown,
}
