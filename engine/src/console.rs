//! Outward calls to the game server's remote console.
//!
//! Every call is fire-and-forget from the engine's point of view: delivery
//! failures are the implementation's concern and never roll back vote state.

use mapvote_types::{MapId, VoterId};

pub trait Console: Send {
    /// Show `text` to every player.
    fn broadcast(&self, text: &str);

    /// Show `text` to one player only.
    fn warn(&self, voter: &VoterId, text: &str);

    /// Make `map` the layer that follows the current round.
    fn set_next_map(&self, map: &MapId);
}
