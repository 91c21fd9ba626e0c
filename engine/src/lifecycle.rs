//! Session lifecycle: decides when a vote opens, collects ballots, and
//! closes it again.
//!
//! ```text
//!            round start (after delay) / restart
//!   Idle ──────────────────────────────────────────▶ Collecting
//!    │  below quorum                                  ▲   │
//!    ▼                                 quorum reached │   │ cancel / new round
//!   AwaitingQuorum ───────────────────────────────────┘   ▼
//!                                                       Closed ──restart──▶ Collecting
//! ```
//!
//! [`MapVote`] is driven by one external dispatcher, one event at a time.
//! Every handler runs to completion, so the ballot/tally invariants hold at
//! every handler boundary. Timers are requested from a [`Scheduler`] and the
//! lifecycle only reacts to ids it still owns.

use crate::command::{AdminKind, ChatMessage, Command, QueryKind};
use crate::config::VoteConfig;
use crate::console::Console;
use crate::error::VoteError;
use crate::format;
use crate::nomination::generate;
use crate::scheduler::Scheduler;
use crate::session::VoteSession;
use crate::tally::CastOutcome;
use mapvote_catalog::MapCatalog;
use mapvote_rules::{RuleSource, RuleTable};
use mapvote_types::{LifecycleState, MapId, TimerId, VoterId};
use mapvote_utils::{format_duration, VoteStat, VoteStats};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;

/// Result of an attempt to open the vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// Nominations were published and ballots are accepted.
    Opened { nominations: usize },
    /// Too few players; every join re-attempts.
    AwaitingQuorum { players: usize, needed: usize },
}

pub struct MapVote {
    config: VoteConfig,
    rule_source: Box<dyn RuleSource>,
    rules: RuleTable,
    catalog: Arc<dyn MapCatalog>,
    console: Box<dyn Console>,
    scheduler: Box<dyn Scheduler>,
    rng: StdRng,
    session: VoteSession,
    current_map: Option<MapId>,
    players: HashSet<VoterId>,
    /// Set while joins should re-attempt the quorum check.
    awaiting_quorum: bool,
    start_timer: Option<TimerId>,
    broadcast_timer: Option<TimerId>,
    stats: VoteStats,
}

impl MapVote {
    /// Build the lifecycle and load the initial rules.
    ///
    /// A rule load failure is logged and leaves an empty rule table.
    pub fn new(
        config: VoteConfig,
        rule_source: Box<dyn RuleSource>,
        catalog: Arc<dyn MapCatalog>,
        console: Box<dyn Console>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        let mut vote = Self {
            config,
            rule_source,
            rules: RuleTable::empty(),
            catalog,
            console,
            scheduler,
            rng: StdRng::from_entropy(),
            session: VoteSession::idle(),
            current_map: None,
            players: HashSet::new(),
            awaiting_quorum: false,
            start_timer: None,
            broadcast_timer: None,
            stats: VoteStats::new(),
        };
        let _ = vote.reload_rules();
        vote
    }

    /// Replace the random source (deterministic tests, reproducible runs).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.session.state()
    }

    pub fn session(&self) -> &VoteSession {
        &self.session
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn config(&self) -> &VoteConfig {
        &self.config
    }

    pub fn current_map(&self) -> Option<&MapId> {
        self.current_map.as_ref()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_awaiting_quorum(&self) -> bool {
        self.awaiting_quorum
    }

    pub fn stats(&self) -> &VoteStats {
        &self.stats
    }

    // ── Events ─────────────────────────────────────────────────────────

    /// A new round started on `map`: close any running vote, start a fresh
    /// session, and schedule the delayed opening.
    pub fn on_new_game(&mut self, map: MapId) {
        tracing::info!(map = %map, "new game");
        self.end_voting();
        self.cancel_start_timer();
        self.awaiting_quorum = false;
        self.session = VoteSession::idle();
        self.current_map = Some(map);

        let delay = self.config.start_delay();
        self.start_timer = Some(self.scheduler.schedule_once(delay));
        tracing::info!("map vote opens in {}", format_duration(delay));
    }

    pub fn on_player_connected(&mut self, voter: VoterId) {
        self.players.insert(voter);
        if self.awaiting_quorum {
            self.retry_quorum();
        }
    }

    /// A player left: withdraw their ballot and re-draw the next map.
    pub fn on_player_disconnected(&mut self, voter: &VoterId) {
        self.players.remove(voter);
        if !self.session.is_collecting() {
            return;
        }
        if let Some(map) = self.session.retract(voter) {
            tracing::debug!(voter = %voter, map = %map, "ballot retracted");
            self.stats.increment(VoteStat::Retracted);
            self.commit_next_map();
        }
    }

    /// Replace the roster wholesale. Ballots of voters no longer present are
    /// withdrawn; a larger roster may satisfy a pending quorum.
    pub fn sync_players(&mut self, players: impl IntoIterator<Item = VoterId>) {
        self.players = players.into_iter().collect();

        if self.session.is_collecting() {
            let present = &self.players;
            let removed = self.session.retain_voters(|voter| present.contains(voter));
            if removed > 0 {
                tracing::debug!(removed, "ballots retracted after roster sync");
                for _ in 0..removed {
                    self.stats.increment(VoteStat::Retracted);
                }
                self.commit_next_map();
            }
        } else if self.awaiting_quorum {
            self.retry_quorum();
        }
    }

    pub fn on_timer(&mut self, id: TimerId) {
        if self.start_timer == Some(id) {
            self.start_timer = None;
            if let Err(err) = self.begin_voting(false) {
                tracing::warn!("delayed map vote start failed: {err}");
            }
        } else if self.broadcast_timer == Some(id) {
            self.broadcast_nominations();
        } else {
            tracing::debug!(timer = %id, "ignoring stale timer");
        }
    }

    /// Handle one chat line. Lines not addressed to the vote are ignored.
    ///
    /// Errors have already been reported to the sender (or deliberately not,
    /// for unauthorized admin commands); they are returned for logging.
    pub fn on_chat(&mut self, message: &ChatMessage) -> Result<(), VoteError> {
        let Some(command) = Command::parse(&message.text, &self.config.command_prefix) else {
            return Ok(());
        };
        let voter = &message.voter;

        match command {
            Command::Cast(choice) => self.cast_vote(voter, &message.name, choice),
            Command::Query(QueryKind::Help) => {
                let prefix = &self.config.command_prefix;
                self.console.warn(voter, &format::help_line(prefix));
                if message.admin {
                    self.console.warn(voter, &format::admin_help_line(prefix));
                }
                Ok(())
            }
            Command::Query(kind) => {
                if !self.session.is_collecting() {
                    self.console.warn(voter, format::NO_ACTIVE_VOTE);
                    return Err(VoteError::NoActiveVote);
                }
                self.send_standings(voter, kind);
                Ok(())
            }
            Command::Admin(kind) => {
                if !message.admin {
                    tracing::debug!(voter = %voter, ?kind, "ignoring admin command from non-admin");
                    return Err(VoteError::UnauthorizedCommand);
                }
                self.run_admin(voter, kind)
            }
            Command::Unknown(arg) => {
                self.console.warn(voter, &format::unknown_subcommand(&arg));
                Err(VoteError::UnknownCommand(arg))
            }
        }
    }

    // ── Operations ─────────────────────────────────────────────────────

    /// Try to open the vote. Below quorum (and not `force`d) the lifecycle
    /// waits for joins instead.
    pub fn begin_voting(&mut self, force: bool) -> Result<StartOutcome, VoteError> {
        if self.session.is_collecting() {
            return Err(VoteError::AlreadyCollecting);
        }

        let players = self.players.len();
        let needed = self.config.min_players_for_vote;
        if players < needed && !force {
            if !self.awaiting_quorum {
                tracing::info!(players, needed, "waiting for quorum before opening map vote");
                self.awaiting_quorum = true;
            }
            self.session.transition(LifecycleState::AwaitingQuorum)?;
            return Ok(StartOutcome::AwaitingQuorum { players, needed });
        }
        self.awaiting_quorum = false;
        self.cancel_start_timer();

        let current = self.current_map.as_ref().map_or("", MapId::as_str);
        let generation = match generate(current, &self.rules, self.catalog.as_ref(), &mut self.rng) {
            Ok(generation) => generation,
            Err(err) => {
                tracing::warn!("{err}; map vote not opened");
                self.session.close();
                return Err(err);
            }
        };

        let nominations = generation.nominations.len();
        if nominations == 0 {
            tracing::warn!(rule = %generation.rule_key, "no nominations generated");
        }
        tracing::info!(
            nominations,
            skipped = generation.skipped.len(),
            rule = %generation.rule_key,
            forced = force,
            "map vote opened"
        );

        self.session = VoteSession::collecting(generation.nominations);
        self.stats.increment(VoteStat::Opened);
        self.broadcast_nominations();
        self.broadcast_timer = Some(
            self.scheduler
                .schedule_repeating(self.config.broadcast_interval()),
        );
        Ok(StartOutcome::Opened { nominations })
    }

    /// Stop collecting and discard the broadcast timer. Ballots stay in the
    /// closed session until the next reset.
    pub fn end_voting(&mut self) {
        if let Some(id) = self.broadcast_timer.take() {
            self.scheduler.cancel(id);
        }
        if self.session.is_collecting() {
            self.session.close();
            let stats = self.stats.take();
            tracing::info!(
                ballots = self.session.ballot_count(),
                %stats,
                "map vote closed"
            );
        }
    }

    /// Reload rules from the rule source. They apply from the next opening;
    /// a running vote keeps its nominations.
    ///
    /// On failure the table is emptied, so the next opening yields no
    /// nominations rather than stale ones.
    pub fn reload_rules(&mut self) -> Result<(), VoteError> {
        match self.rule_source.load() {
            Ok(table) => {
                tracing::info!(
                    source = %self.rule_source.describe(),
                    prefixes = table.len(),
                    defaults = table.default_rules().len(),
                    "map vote rules loaded"
                );
                self.rules = table;
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    source = %self.rule_source.describe(),
                    "{err}; continuing with an empty rule set"
                );
                self.rules = RuleTable::empty();
                Err(err.into())
            }
        }
    }

    fn cast_vote(&mut self, voter: &VoterId, name: &str, choice: i64) -> Result<(), VoteError> {
        match self.session.cast_vote(voter, choice) {
            Ok(accepted) => {
                self.stats.increment(VoteStat::Cast);
                if matches!(accepted.outcome, CastOutcome::Changed { .. }) {
                    self.stats.increment(VoteStat::Changed);
                }
                tracing::debug!(voter = %voter, map = %accepted.nomination, outcome = ?accepted.outcome, "ballot cast");
                self.console.warn(voter, &format::vote_ack(&accepted.nomination));
                self.commit_next_map();
                Ok(())
            }
            Err(VoteError::NoActiveVote) => {
                self.console.warn(voter, format::NO_ACTIVE_VOTE);
                Err(VoteError::NoActiveVote)
            }
            Err(err @ VoteError::ChoiceOutOfRange { .. }) => {
                self.stats.increment(VoteStat::Rejected);
                self.console
                    .warn(voter, &format::invalid_choice(&self.config.command_prefix, name));
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    fn run_admin(&mut self, voter: &VoterId, kind: AdminKind) -> Result<(), VoteError> {
        match kind {
            AdminKind::Restart => {
                if self.session.is_collecting() {
                    self.console.warn(voter, format::ALREADY_ENABLED);
                    return Err(VoteError::AlreadyCollecting);
                }
                tracing::info!(admin = %voter, "map vote restarted by admin");
                match self.begin_voting(true) {
                    Ok(_) => Ok(()),
                    Err(err) => {
                        self.console.warn(voter, &format!("Could not start vote: {err}"));
                        Err(err)
                    }
                }
            }
            AdminKind::Cancel => {
                if !self.session.is_collecting() {
                    self.console.warn(voter, format::ALREADY_DISABLED);
                    return Err(VoteError::NoActiveVote);
                }
                tracing::info!(admin = %voter, "map vote cancelled by admin");
                self.end_voting();
                self.console.warn(voter, format::VOTE_CANCELLED);
                Ok(())
            }
            AdminKind::Reload => match self.reload_rules() {
                Ok(()) => {
                    self.console.warn(voter, format::RULES_RELOADED);
                    Ok(())
                }
                Err(err) => {
                    self.console.warn(voter, format::RULES_RELOAD_FAILED);
                    Err(err)
                }
            },
        }
    }

    fn retry_quorum(&mut self) {
        match self.begin_voting(false) {
            Ok(StartOutcome::AwaitingQuorum { players, needed }) => {
                tracing::trace!(players, needed, "still below quorum");
            }
            Ok(StartOutcome::Opened { .. }) => {}
            Err(err) => tracing::warn!("map vote start on join failed: {err}"),
        }
    }

    fn cancel_start_timer(&mut self) {
        if let Some(id) = self.start_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    /// Draw from the current winner set and hand it to the server.
    fn commit_next_map(&mut self) {
        match self.session.draw_winner(&mut self.rng) {
            Some(map) => {
                tracing::debug!(map = %map, "setting next map");
                self.console.set_next_map(map);
            }
            None => tracing::debug!("no nominations; next map left unchanged"),
        }
    }

    fn broadcast_nominations(&self) {
        let prefix = &self.config.command_prefix;
        self.console.broadcast(&format::broadcast_header(prefix));
        let lines: Vec<String> = self
            .session
            .choices()
            .iter()
            .map(|row| format::choice_line(prefix, row))
            .collect();
        if !lines.is_empty() {
            self.console.broadcast(&lines.join("\n"));
        }
    }

    fn send_standings(&self, voter: &VoterId, kind: QueryKind) {
        let prefix = &self.config.command_prefix;
        let rows = match kind {
            QueryKind::Results => self.session.standings(),
            QueryKind::Choices | QueryKind::Help => self.session.choices(),
        };
        for row in &rows {
            self.console.warn(voter, &format::choice_line(prefix, row));
        }
        self.console
            .warn(voter, &format::winners_line(&self.session.winners()));
    }
}

impl Drop for MapVote {
    fn drop(&mut self) {
        self.cancel_start_timer();
        if let Some(id) = self.broadcast_timer.take() {
            self.scheduler.cancel(id);
        }
    }
}
