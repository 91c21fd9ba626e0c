//! In-memory catalog backed by a sorted set.

use crate::error::CatalogError;
use crate::MapCatalog;
use mapvote_types::MapId;
use std::collections::BTreeSet;
use std::ops::Bound;
use std::path::Path;

/// Sorted set of layer ids; prefix queries are range scans.
#[derive(Clone, Debug, Default)]
pub struct LayerCatalog {
    layers: BTreeSet<String>,
}

impl LayerCatalog {
    pub fn new<I, S>(layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            layers: layers.into_iter().map(Into::into).collect(),
        }
    }

    /// One id per line. Blank lines and `#` comments are skipped.
    pub fn from_lines(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// A JSON array of id strings.
    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        let layers: Vec<String> = serde_json::from_str(s)?;
        Ok(Self::new(layers))
    }

    /// Load from disk; `.json` files are parsed as an array, anything else
    /// as one id per line.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_lines(&content),
        };
        tracing::info!(path = %path.display(), layers = catalog.len(), "loaded map catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl MapCatalog for LayerCatalog {
    fn contains(&self, id: &str) -> bool {
        self.layers.contains(id)
    }

    fn with_prefix(&self, prefix: &str) -> Vec<MapId> {
        self.layers
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|layer| layer.starts_with(prefix))
            .map(|layer| MapId::new(layer.as_str()))
            .collect()
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.layers
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .next()
            .is_some_and(|layer| layer.starts_with(prefix))
    }
}
