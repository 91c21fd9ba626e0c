//! Chat command classification.
//!
//! Every message starting with the configured prefix is classified into a
//! closed [`Command`] before anything is dispatched.

use mapvote_types::VoterId;

/// A chat line as delivered by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub voter: VoterId,
    pub name: String,
    pub text: String,
    /// Whether the line was sent on the admin channel.
    pub admin: bool,
}

/// Read-only subcommands any player may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
    /// Nominations in display order.
    Choices,
    /// Nominations ordered by votes.
    Results,
    Help,
}

/// Subcommands reserved for admins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminKind {
    Restart,
    Cancel,
    Reload,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// A 1-based ballot. Range is checked later against the live session.
    Cast(i64),
    Query(QueryKind),
    Admin(AdminKind),
    Unknown(String),
}

impl Command {
    /// Classify `text`, or `None` when it is not addressed to the vote.
    ///
    /// Matching is case-insensitive and the prefix must be followed by
    /// whitespace or the end of the line.
    pub fn parse(text: &str, prefix: &str) -> Option<Self> {
        let text = text.trim().to_lowercase();
        let rest = text.strip_prefix(&prefix.to_lowercase())?;
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let arg = rest.trim();

        let command = match arg {
            "choices" => Self::Query(QueryKind::Choices),
            "results" => Self::Query(QueryKind::Results),
            "help" => Self::Query(QueryKind::Help),
            "restart" => Self::Admin(AdminKind::Restart),
            "cancel" => Self::Admin(AdminKind::Cancel),
            "reload" => Self::Admin(AdminKind::Reload),
            _ => match arg.parse::<i64>() {
                Ok(choice) => Self::Cast(choice),
                Err(_) => Self::Unknown(arg.to_string()),
            },
        };
        Some(command)
    }
}
