//! Catalog of every map identifier the game server accepts.
//!
//! The vote engine only ever reads the catalog: to check that a composed
//! candidate exists and to resolve wildcard modes and versions.

pub mod error;
pub mod layers;

pub use error::CatalogError;
pub use layers::LayerCatalog;

use mapvote_types::MapId;

/// Read-only lookup over valid map identifiers.
pub trait MapCatalog: Send + Sync {
    /// Whether `id` names a real map.
    fn contains(&self, id: &str) -> bool;

    /// All identifiers starting with `prefix`, in a stable order.
    fn with_prefix(&self, prefix: &str) -> Vec<MapId>;

    /// Whether any identifier starts with `prefix`.
    fn has_prefix(&self, prefix: &str) -> bool {
        !self.with_prefix(prefix).is_empty()
    }
}
