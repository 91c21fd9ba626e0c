//! Map vote daemon: reads game events as JSON lines on stdin, writes
//! remote-console calls as JSON lines on stdout.

mod console;
mod event;
mod runner;
mod scheduler;

use anyhow::{bail, Context};
use clap::Parser;
use console::LineConsole;
use event::LoopEvent;
use mapvote_catalog::LayerCatalog;
use mapvote_engine::{MapVote, VoteConfig};
use mapvote_rules::FileRuleSource;
use mapvote_utils::LogFormat;
use rand::rngs::StdRng;
use rand::SeedableRng;
use scheduler::TokioScheduler;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "mapvote-daemon", about = "Next-map vote for a game server")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "MAPVOTE_CONFIG")]
    config: Option<PathBuf>,

    /// JSON rule file.
    #[arg(long, env = "MAPVOTE_RULES")]
    rules: Option<PathBuf>,

    /// Layer list (one id per line, or a JSON array).
    #[arg(long, env = "MAPVOTE_CATALOG")]
    catalog: Option<PathBuf>,

    /// Chat prefix that addresses the vote.
    #[arg(long, env = "MAPVOTE_PREFIX")]
    prefix: Option<String>,

    /// Players needed before a vote opens on its own.
    #[arg(long, env = "MAPVOTE_MIN_PLAYERS")]
    min_players: Option<usize>,

    /// Seconds between round start and the vote opening.
    #[arg(long, env = "MAPVOTE_START_DELAY_SECS")]
    start_delay_secs: Option<u64>,

    /// Seconds between candidate list broadcasts.
    #[arg(long, env = "MAPVOTE_BROADCAST_INTERVAL_SECS")]
    broadcast_interval_secs: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "MAPVOTE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "MAPVOTE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Seed the random source for reproducible draws.
    #[arg(long, env = "MAPVOTE_SEED")]
    seed: Option<u64>,
}

impl Cli {
    fn apply(self, base: VoteConfig) -> VoteConfig {
        VoteConfig {
            command_prefix: self.prefix.unwrap_or(base.command_prefix),
            vote_rules_path: self.rules.or(base.vote_rules_path),
            catalog_path: self.catalog.or(base.catalog_path),
            min_players_for_vote: self.min_players.unwrap_or(base.min_players_for_vote),
            start_delay_secs: self.start_delay_secs.unwrap_or(base.start_delay_secs),
            broadcast_interval_secs: self
                .broadcast_interval_secs
                .unwrap_or(base.broadcast_interval_secs),
            log_format: self.log_format.unwrap_or(base.log_format),
            log_level: self.log_level.unwrap_or(base.log_level),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();
    let seed = cli.seed;

    // Logging is configured by the file, so file errors are reported once
    // the subscriber exists.
    let file_config = cli.config.take().map(|path| {
        let loaded = VoteConfig::from_toml_file(&path.to_string_lossy());
        (path, loaded)
    });
    let (base, file_error) = match file_config {
        Some((path, Ok(cfg))) => (cfg, Some(Ok(path))),
        Some((path, Err(e))) => (VoteConfig::default(), Some(Err((path, e)))),
        None => (VoteConfig::default(), None),
    };
    let config = cli.apply(base);
    config.validate().context("invalid configuration")?;

    mapvote_utils::init_logging(config.log_format, &config.log_level);
    match file_error {
        Some(Ok(path)) => tracing::info!("Loaded config from {}", path.display()),
        Some(Err((path, e))) => tracing::warn!(
            "Failed to load config file {}: {e}, using defaults",
            path.display()
        ),
        None => {}
    }

    let Some(rules_path) = config.vote_rules_path.clone() else {
        bail!("no rule file configured (--rules or vote_rules_path)");
    };
    let Some(catalog_path) = config.catalog_path.clone() else {
        bail!("no layer catalog configured (--catalog or catalog_path)");
    };
    let catalog = LayerCatalog::from_file(&catalog_path)
        .with_context(|| format!("loading layer catalog {}", catalog_path.display()))?;

    tracing::info!(
        prefix = %config.command_prefix,
        min_players = config.min_players_for_vote,
        start_delay_secs = config.start_delay_secs,
        broadcast_interval_secs = config.broadcast_interval_secs,
        "starting map vote daemon"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let vote = MapVote::new(
        config,
        Box::new(FileRuleSource::new(rules_path)),
        Arc::new(catalog),
        Box::new(LineConsole::new(std::io::stdout())),
        Box::new(TokioScheduler::new(tx.clone())),
    )
    .with_rng(rng);

    let shutdown_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(LoopEvent::Shutdown);
        }
    });
    std::thread::spawn(move || runner::read_events(std::io::stdin().lock(), tx));

    runner::run(vote, rx).await;
    tracing::info!("map vote daemon stopped");
    Ok(())
}
