//! Player-facing message texts.

use crate::session::Standing;
use mapvote_types::MapId;

pub const NO_ACTIVE_VOTE: &str = "There is no vote running right now";
pub const ALREADY_ENABLED: &str = "Voting is already enabled";
pub const ALREADY_DISABLED: &str = "Voting is already disabled";
pub const VOTE_CANCELLED: &str = "ending current vote";
pub const RULES_RELOADED: &str = "Reloaded map vote layers configuration";
pub const RULES_RELOAD_FAILED: &str = "Failed to reload map vote layers configuration";

pub fn choice_line(prefix: &str, standing: &Standing<'_>) -> String {
    format!(
        "type {prefix} {} : {} ({} votes)",
        standing.index + 1,
        standing.nomination,
        standing.votes
    )
}

pub fn broadcast_header(prefix: &str) -> String {
    format!("Type {prefix} <map number> in chat to cast your vote, Candidates:")
}

pub fn winners_line(winners: &[&MapId]) -> String {
    if winners.is_empty() {
        return "No candidates this round".to_string();
    }
    let names: Vec<&str> = winners.iter().map(|m| m.as_str()).collect();
    let plural = if winners.len() > 1 { "s" } else { "" };
    format!("Current winner{plural}: {}", names.join(", "))
}

pub fn vote_ack(nomination: &MapId) -> String {
    format!("you voted for {nomination}")
}

pub fn invalid_choice(prefix: &str, player_name: &str) -> String {
    format!("{player_name}: invalid map number, type {prefix} results to see map numbers")
}

pub fn unknown_subcommand(arg: &str) -> String {
    format!("Unknown vote subcommand: {arg}")
}

pub fn help_line(prefix: &str) -> String {
    format!("{prefix} <choices|number|results>")
}

pub fn admin_help_line(prefix: &str) -> String {
    format!("{prefix} <restart|cancel|reload> (admin only)")
}
