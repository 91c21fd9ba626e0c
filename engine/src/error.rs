use mapvote_types::LifecycleState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("choice {choice} is out of range (1..={available})")]
    ChoiceOutOfRange { choice: i64, available: usize },

    #[error("there is no vote running right now")]
    NoActiveVote,

    #[error("voting is already enabled")]
    AlreadyCollecting,

    #[error("current map is unknown; cannot generate nominations")]
    UnknownCurrentMap,

    #[error("no catalog match for {candidate} (rule \"{rule}\")")]
    NoCatalogMatch { candidate: String, rule: String },

    #[error("command requires admin privileges")]
    UnauthorizedCommand,

    #[error("unknown vote subcommand: {0}")]
    UnknownCommand(String),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("rules error: {0}")]
    Rules(#[from] mapvote_rules::RulesError),

    #[error("config error: {0}")]
    Config(String),
}
