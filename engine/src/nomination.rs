//! Nomination generation: turns the running map and the rule table into the
//! candidate list for the next vote.
//!
//! Generation is best effort: each candidate rule is resolved independently
//! and a rule that cannot be matched against the catalog is skipped with a
//! diagnostic, never aborting the batch.

use crate::error::VoteError;
use mapvote_catalog::MapCatalog;
use mapvote_rules::{CandidateRule, RuleTable, DEFAULT_KEY, VARIANT_PREFIX, WILDCARD};
use mapvote_types::MapId;
use rand::seq::SliceRandom;
use rand::Rng;

/// Result of one generation pass.
#[derive(Debug, Default)]
pub struct Generation {
    /// Resolved candidates in rule order.
    pub nominations: Vec<MapId>,
    /// The rule key that was matched (`default` when nothing else matched).
    pub rule_key: String,
    /// One entry per skipped candidate rule.
    pub skipped: Vec<VoteError>,
}

/// The candidate list selected for a running map.
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub key: &'a str,
    pub rules: &'a [CandidateRule],
}

/// Find the candidate list for `current_map`.
///
/// The id itself is tried first; then the variant prefix and trailing
/// `_`-segments are stripped one at a time, checking after each strip.
/// Falls back to the table's default list.
pub fn resolve_rules<'a>(current_map: &'a str, table: &'a RuleTable) -> RuleMatch<'a> {
    let mut remaining = current_map;
    while !remaining.is_empty() {
        if let Some(rules) = table.get(remaining) {
            return RuleMatch {
                key: remaining,
                rules,
            };
        }
        remaining = match remaining.strip_prefix(VARIANT_PREFIX) {
            Some(stripped) => stripped,
            None => remaining.rsplit_once('_').map_or("", |(head, _)| head),
        };
    }
    RuleMatch {
        key: DEFAULT_KEY,
        rules: table.default_rules(),
    }
}

/// Build the nominations for the round after `current_map`.
///
/// Fails only when `current_map` is empty; per-rule failures end up in
/// [`Generation::skipped`].
pub fn generate<R: Rng + ?Sized>(
    current_map: &str,
    table: &RuleTable,
    catalog: &dyn MapCatalog,
    rng: &mut R,
) -> Result<Generation, VoteError> {
    if current_map.is_empty() {
        return Err(VoteError::UnknownCurrentMap);
    }

    let matched = resolve_rules(current_map, table);
    tracing::debug!(
        current_map,
        rule = matched.key,
        candidates = matched.rules.len(),
        "resolved vote rules"
    );

    let mut generation = Generation {
        rule_key: matched.key.to_string(),
        ..Default::default()
    };
    for rule in matched.rules {
        match resolve_candidate(rule, matched.key, table, catalog, rng) {
            Ok(id) => generation.nominations.push(id),
            Err(err) => {
                tracing::warn!(rule = matched.key, map = %rule.map_name, "{err}");
                generation.skipped.push(err);
            }
        }
    }
    Ok(generation)
}

fn resolve_candidate<R: Rng + ?Sized>(
    rule: &CandidateRule,
    rule_key: &str,
    table: &RuleTable,
    catalog: &dyn MapCatalog,
    rng: &mut R,
) -> Result<MapId, VoteError> {
    let map = rule.map_name.as_str();
    let no_match = |candidate: String| VoteError::NoCatalogMatch {
        candidate,
        rule: rule_key.to_string(),
    };

    let picked_mode = rule
        .modes
        .choose(rng)
        .ok_or_else(|| no_match(format!("{map}_<no modes>")))?;
    let picked_version = rule
        .versions
        .choose(rng)
        .ok_or_else(|| no_match(format!("{map}_<no versions>")))?;

    let (prefix, version) = match picked_version.strip_prefix(VARIANT_PREFIX) {
        Some(version) => (VARIANT_PREFIX, version),
        None => ("", picked_version.as_str()),
    };

    let mode = if picked_mode == WILDCARD {
        wildcard_mode(prefix, map, table.modes(), catalog, rng)
            .ok_or_else(|| no_match(format!("{prefix}{map}_{WILDCARD}")))?
    } else {
        picked_mode.clone()
    };

    let version = if version == WILDCARD {
        let stem = format!("{prefix}{map}_{mode}_");
        let versions: Vec<String> = catalog
            .with_prefix(&stem)
            .iter()
            .filter_map(|id| id.version_suffix().map(str::to_string))
            .collect();
        versions
            .choose(rng)
            .cloned()
            .ok_or_else(|| no_match(format!("{stem}{WILDCARD}")))?
    } else {
        version.to_string()
    };

    let candidate = format!("{prefix}{map}_{mode}_{version}");
    if !catalog.contains(&candidate) {
        return Err(no_match(candidate));
    }
    Ok(MapId::new(candidate))
}

/// Draw modes without replacement until one has a catalog entry for `map`.
fn wildcard_mode<R: Rng + ?Sized>(
    prefix: &str,
    map: &str,
    modes: &[String],
    catalog: &dyn MapCatalog,
    rng: &mut R,
) -> Option<String> {
    let mut pool: Vec<&String> = modes.iter().collect();
    while !pool.is_empty() {
        let mode = pool.swap_remove(rng.gen_range(0..pool.len()));
        if catalog.has_prefix(&format!("{prefix}{map}_{mode}_")) {
            return Some(mode.clone());
        }
    }
    None
}
