//! Lifecycle tests driving `MapVote` end-to-end through the nullable
//! console, scheduler and rule source: round start → delayed opening →
//! quorum wait → ballots → disconnects → cancel/restart.

use mapvote_catalog::LayerCatalog;
use mapvote_engine::{ChatMessage, MapVote, StartOutcome, VoteConfig, VoteError};
use mapvote_nullables::{ManualScheduler, NullConsole, StaticRuleSource};
use mapvote_rules::{CandidateRule, RuleTable};
use mapvote_types::{LifecycleState, MapId, VoterId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const RULES: &str = r#"{
    "rules": {
        "default": [
            {"map": "Narva", "modes": ["Invasion"], "versions": ["v1"]},
            {"map": "Gorodok", "modes": ["RAAS"], "versions": ["v2"]},
            {"map": "Mestia", "modes": ["AAS"], "versions": ["v1"]}
        ]
    },
    "modes": ["RAAS", "AAS", "Invasion"]
}"#;

const LAYERS: [&str; 4] = [
    "Narva_Invasion_v1",
    "Gorodok_RAAS_v2",
    "Mestia_AAS_v1",
    "Kohat_RAAS_v1",
];

struct Harness {
    vote: MapVote,
    console: NullConsole,
    scheduler: ManualScheduler,
    rules: StaticRuleSource,
}

impl Harness {
    fn new(min_players: usize) -> Self {
        Self::with_rules(StaticRuleSource::from_json(RULES), min_players)
    }

    fn with_rules(rules: StaticRuleSource, min_players: usize) -> Self {
        let console = NullConsole::new();
        let scheduler = ManualScheduler::new();
        let config = VoteConfig {
            min_players_for_vote: min_players,
            start_delay_secs: 60,
            broadcast_interval_secs: 30,
            ..Default::default()
        };
        let vote = MapVote::new(
            config,
            Box::new(rules.clone()),
            Arc::new(LayerCatalog::new(LAYERS)),
            Box::new(console.clone()),
            Box::new(scheduler.clone()),
        )
        .with_rng(StdRng::seed_from_u64(42));
        Self {
            vote,
            console,
            scheduler,
            rules,
        }
    }

    /// Advance virtual time and feed every fired timer into the engine.
    fn advance(&mut self, secs: u64) {
        for id in self.scheduler.advance(Duration::from_secs(secs)) {
            self.vote.on_timer(id);
        }
    }

    fn join(&mut self, count: usize) {
        for i in 0..count {
            self.vote.on_player_connected(player(&format!("p{i}")));
        }
    }

    fn say(&mut self, who: &str, text: &str) -> Result<(), VoteError> {
        self.vote.on_chat(&chat(who, text, false))
    }

    fn admin(&mut self, who: &str, text: &str) -> Result<(), VoteError> {
        self.vote.on_chat(&chat(who, text, true))
    }

    /// New round on Kohat, delay elapsed, vote open.
    fn open(&mut self) {
        self.vote.on_new_game(MapId::new("Kohat_RAAS_v1"));
        self.advance(60);
        assert_eq!(self.vote.state(), LifecycleState::Collecting);
    }

    fn assert_invariants(&self) {
        let session = self.vote.session();
        assert_eq!(session.tallies().len(), session.nominations().len());
        let sum: u32 = session.tallies().iter().sum();
        assert_eq!(sum as usize, session.ballot_count());
    }
}

fn player(id: &str) -> VoterId {
    VoterId::new(id)
}

fn chat(who: &str, text: &str, admin: bool) -> ChatMessage {
    ChatMessage {
        voter: player(who),
        name: who.to_uppercase(),
        text: text.to_string(),
        admin,
    }
}

// ---------------------------------------------------------------------------
// 1. Opening
// ---------------------------------------------------------------------------

#[test]
fn vote_opens_after_start_delay() {
    let mut h = Harness::new(0);
    h.vote.on_new_game(MapId::new("Kohat_RAAS_v1"));
    assert_eq!(h.vote.state(), LifecycleState::Idle);

    h.advance(59);
    assert_eq!(h.vote.state(), LifecycleState::Idle);

    h.advance(1);
    assert_eq!(h.vote.state(), LifecycleState::Collecting);
    assert_eq!(
        h.vote.session().nominations(),
        [
            MapId::new("Narva_Invasion_v1"),
            MapId::new("Gorodok_RAAS_v2"),
            MapId::new("Mestia_AAS_v1"),
        ]
    );
    assert_eq!(h.vote.session().tallies(), [0, 0, 0]);

    let broadcasts = h.console.broadcasts();
    assert_eq!(
        broadcasts[0],
        "Type !vote <map number> in chat to cast your vote, Candidates:"
    );
    assert!(broadcasts[1].starts_with("type !vote 1 : Narva_Invasion_v1 (0 votes)"));
}

#[test]
fn default_rule_scenario_yields_single_nomination() {
    let rules = StaticRuleSource::from_json(
        r#"{"rules": {"default": [{"map": "Narva", "modes": ["Invasion"], "versions": ["v1"]}]}}"#,
    );
    let mut h = Harness::with_rules(rules, 0);
    h.open();
    assert_eq!(h.vote.session().nominations(), [MapId::new("Narva_Invasion_v1")]);
    assert_eq!(h.vote.session().tallies(), [0]);
}

#[test]
fn below_quorum_waits_for_joins() {
    let mut h = Harness::new(3);
    h.vote.on_new_game(MapId::new("Kohat_RAAS_v1"));
    h.advance(60);
    assert_eq!(h.vote.state(), LifecycleState::AwaitingQuorum);
    assert!(h.vote.is_awaiting_quorum());

    h.join(2);
    assert_eq!(h.vote.state(), LifecycleState::AwaitingQuorum);

    h.join(3);
    assert_eq!(h.vote.state(), LifecycleState::Collecting);
    assert!(!h.vote.is_awaiting_quorum());
}

#[test]
fn roster_sync_can_satisfy_quorum() {
    let mut h = Harness::new(2);
    h.vote.on_new_game(MapId::new("Kohat_RAAS_v1"));
    h.advance(60);
    assert_eq!(h.vote.state(), LifecycleState::AwaitingQuorum);

    h.vote.sync_players([player("a"), player("b")]);
    assert_eq!(h.vote.state(), LifecycleState::Collecting);
}

#[test]
fn start_attempt_while_collecting_is_noop() {
    let mut h = Harness::new(0);
    h.open();
    h.say("a", "!vote 1").unwrap();

    let err = h.vote.begin_voting(true).unwrap_err();
    assert!(matches!(err, VoteError::AlreadyCollecting));
    assert_eq!(h.vote.session().tallies(), [1, 0, 0]);
}

#[test]
fn unknown_current_map_does_not_open() {
    let mut h = Harness::new(0);
    let err = h.vote.begin_voting(true).unwrap_err();
    assert!(matches!(err, VoteError::UnknownCurrentMap));
    assert_eq!(h.vote.state(), LifecycleState::Closed);
    assert_eq!(h.scheduler.pending(), 0);
}

#[test]
fn failed_rule_load_opens_without_candidates() {
    let mut h = Harness::with_rules(StaticRuleSource::failing(), 0);
    assert!(h.vote.rules().is_empty());

    h.open();
    assert!(h.vote.session().nominations().is_empty());

    let err = h.say("a", "!vote 1").unwrap_err();
    assert!(matches!(err, VoteError::ChoiceOutOfRange { available: 0, .. }));
    assert!(h.console.next_maps().is_empty());
}

// ---------------------------------------------------------------------------
// 2. Ballots
// ---------------------------------------------------------------------------

#[test]
fn cast_acknowledges_and_sets_next_map() {
    let mut h = Harness::new(0);
    h.open();

    h.say("a", "!vote 2").unwrap();
    assert_eq!(h.vote.session().tallies(), [0, 1, 0]);
    assert_eq!(
        h.console.warnings_to(&player("a")),
        vec!["you voted for Gorodok_RAAS_v2".to_string()]
    );
    assert_eq!(h.console.last_next_map(), Some(MapId::new("Gorodok_RAAS_v2")));
    h.assert_invariants();
}

#[test]
fn changing_vote_moves_the_count() {
    let mut h = Harness::new(0);
    h.open();
    h.say("a", "!vote 1").unwrap();
    h.say("a", "!vote 3").unwrap();
    assert_eq!(h.vote.session().tallies(), [0, 0, 1]);
    assert_eq!(h.vote.session().ballot_of(&player("a")), Some(&MapId::new("Mestia_AAS_v1")));
    h.assert_invariants();
}

#[test]
fn boundary_choices_are_rejected() {
    let mut h = Harness::new(0);
    h.open();

    for text in ["!vote 0", "!vote 4"] {
        let err = h.say("a", text).unwrap_err();
        assert!(matches!(err, VoteError::ChoiceOutOfRange { .. }));
    }
    assert_eq!(h.vote.session().tallies(), [0, 0, 0]);
    assert_eq!(
        h.console.warnings_to(&player("a"))[0],
        "A: invalid map number, type !vote results to see map numbers"
    );
}

#[test]
fn tied_votes_only_ever_draw_tied_maps() {
    let mut h = Harness::new(0);
    h.open();
    h.say("a", "!vote 1").unwrap();
    h.say("b", "!vote 2").unwrap();
    assert_eq!(h.vote.session().tallies(), [1, 1, 0]);

    for _ in 0..20 {
        h.say("b", "!vote 2").unwrap();
    }
    for map in h.console.next_maps().iter().skip(1) {
        assert!(
            map.as_str() == "Narva_Invasion_v1" || map.as_str() == "Gorodok_RAAS_v2",
            "drew {map}"
        );
    }
}

#[test]
fn voting_without_active_vote_is_refused() {
    let mut h = Harness::new(0);
    let err = h.say("a", "!vote 1").unwrap_err();
    assert!(matches!(err, VoteError::NoActiveVote));
    assert_eq!(
        h.console.warnings_to(&player("a")),
        vec!["There is no vote running right now".to_string()]
    );
}

#[test]
fn disconnect_retracts_and_restores_tie() {
    let mut h = Harness::new(0);
    h.open();
    h.vote.on_player_connected(player("a"));
    h.say("a", "!vote 1").unwrap();
    assert_eq!(h.vote.session().winners(), vec![&MapId::new("Narva_Invasion_v1")]);

    h.vote.on_player_disconnected(&player("a"));
    assert_eq!(h.vote.session().tallies(), [0, 0, 0]);
    assert_eq!(h.vote.session().winners().len(), 3);
    assert_eq!(h.console.next_maps().len(), 2);
    h.assert_invariants();
}

#[test]
fn disconnect_without_ballot_changes_nothing() {
    let mut h = Harness::new(0);
    h.open();
    h.say("a", "!vote 1").unwrap();
    h.vote.on_player_disconnected(&player("b"));
    assert_eq!(h.vote.session().tallies(), [1, 0, 0]);
    assert_eq!(h.console.next_maps().len(), 1);
}

#[test]
fn roster_sync_drops_ballots_of_absent_players() {
    let mut h = Harness::new(0);
    h.open();
    h.say("a", "!vote 1").unwrap();
    h.say("b", "!vote 2").unwrap();
    h.say("c", "!vote 2").unwrap();

    h.vote.sync_players([player("a"), player("c")]);
    assert_eq!(h.vote.session().tallies(), [1, 1, 0]);
    assert_eq!(h.vote.player_count(), 2);
    h.assert_invariants();
}

// ---------------------------------------------------------------------------
// 3. Queries and unknown commands
// ---------------------------------------------------------------------------

#[test]
fn choices_lists_display_order_and_results_sorts_by_votes() {
    let mut h = Harness::new(0);
    h.open();
    h.say("a", "!vote 3").unwrap();
    h.console.clear();

    h.say("q", "!vote choices").unwrap();
    h.say("r", "!vote results").unwrap();

    let choices = h.console.warnings_to(&player("q"));
    assert_eq!(choices.len(), 4);
    assert!(choices[0].starts_with("type !vote 1 : Narva_Invasion_v1"));
    assert_eq!(choices[3], "Current winner: Mestia_AAS_v1");

    let results = h.console.warnings_to(&player("r"));
    assert_eq!(results[0], "type !vote 3 : Mestia_AAS_v1 (1 votes)");
    assert_eq!(results[3], "Current winner: Mestia_AAS_v1");
}

#[test]
fn queries_need_an_active_vote() {
    let mut h = Harness::new(0);
    assert!(matches!(h.say("a", "!vote results"), Err(VoteError::NoActiveVote)));
}

#[test]
fn help_shows_admin_line_to_admins_only() {
    let mut h = Harness::new(0);
    h.say("a", "!vote help").unwrap();
    h.admin("root", "!vote help").unwrap();
    assert_eq!(h.console.warnings_to(&player("a")).len(), 1);
    assert_eq!(
        h.console.warnings_to(&player("root")),
        vec![
            "!vote <choices|number|results>".to_string(),
            "!vote <restart|cancel|reload> (admin only)".to_string(),
        ]
    );
}

#[test]
fn unknown_subcommand_gets_error_reply() {
    let mut h = Harness::new(0);
    h.open();
    let err = h.say("a", "!vote narva").unwrap_err();
    assert!(matches!(err, VoteError::UnknownCommand(ref arg) if arg == "narva"));
    assert_eq!(
        h.console.warnings_to(&player("a")),
        vec!["Unknown vote subcommand: narva".to_string()]
    );
    assert_eq!(h.vote.session().ballot_count(), 0);
}

#[test]
fn ordinary_chat_is_ignored() {
    let mut h = Harness::new(0);
    h.open();
    h.console.clear();
    h.say("a", "gg wp").unwrap();
    assert!(h.console.calls().is_empty());
}

// ---------------------------------------------------------------------------
// 4. Admin commands
// ---------------------------------------------------------------------------

#[test]
fn admin_commands_from_players_are_silently_ignored() {
    let mut h = Harness::new(0);
    h.open();
    for text in ["!vote cancel", "!vote restart", "!vote reload"] {
        assert!(matches!(h.say("a", text), Err(VoteError::UnauthorizedCommand)));
    }
    assert!(h.console.warnings_to(&player("a")).is_empty());
    assert_eq!(h.vote.state(), LifecycleState::Collecting);
}

#[test]
fn cancel_closes_and_stops_broadcasts() {
    let mut h = Harness::new(0);
    h.open();
    h.advance(30);
    let before = h.console.broadcasts().len();
    assert_eq!(before, 4);

    h.admin("root", "!vote cancel").unwrap();
    assert_eq!(h.vote.state(), LifecycleState::Closed);
    assert_eq!(
        h.console.warnings_to(&player("root")),
        vec!["ending current vote".to_string()]
    );

    h.advance(300);
    assert_eq!(h.console.broadcasts().len(), before);
    assert_eq!(h.scheduler.pending(), 0);

    assert!(matches!(h.say("a", "!vote 1"), Err(VoteError::NoActiveVote)));
    assert!(matches!(h.admin("root", "!vote cancel"), Err(VoteError::NoActiveVote)));
}

#[test]
fn restart_reopens_with_fresh_ballots_and_skips_quorum() {
    let mut h = Harness::new(100);
    h.vote.on_new_game(MapId::new("Kohat_RAAS_v1"));
    h.advance(60);
    assert_eq!(h.vote.state(), LifecycleState::AwaitingQuorum);

    h.admin("root", "!vote restart").unwrap();
    assert_eq!(h.vote.state(), LifecycleState::Collecting);
    h.say("a", "!vote 1").unwrap();

    h.admin("root", "!vote cancel").unwrap();
    h.admin("root", "!vote restart").unwrap();
    assert_eq!(h.vote.state(), LifecycleState::Collecting);
    assert_eq!(h.vote.session().ballot_count(), 0);
    assert_eq!(h.vote.session().tallies(), [0, 0, 0]);
}

#[test]
fn restart_while_collecting_is_refused() {
    let mut h = Harness::new(0);
    h.open();
    let err = h.admin("root", "!vote restart").unwrap_err();
    assert!(matches!(err, VoteError::AlreadyCollecting));
    assert_eq!(
        h.console.warnings_to(&player("root")),
        vec!["Voting is already enabled".to_string()]
    );
}

#[test]
fn reload_applies_from_next_opening() {
    let mut h = Harness::new(0);
    h.open();

    let replacement = RuleTable::new(
        HashMap::new(),
        vec![CandidateRule::new("Kohat", ["RAAS"], ["v1"])],
        vec![],
    )
    .unwrap();
    h.rules.set(Some(replacement));
    h.admin("root", "!vote reload").unwrap();
    assert_eq!(h.vote.session().nominations().len(), 3);

    h.admin("root", "!vote cancel").unwrap();
    h.admin("root", "!vote restart").unwrap();
    assert_eq!(h.vote.session().nominations(), [MapId::new("Kohat_RAAS_v1")]);
}

#[test]
fn failed_reload_empties_rules_and_reports() {
    let mut h = Harness::new(0);
    h.rules.set(None);
    let err = h.admin("root", "!vote reload").unwrap_err();
    assert!(matches!(err, VoteError::Rules(_)));
    assert!(h.vote.rules().is_empty());
    assert_eq!(
        h.console.warnings_to(&player("root")),
        vec!["Failed to reload map vote layers configuration".to_string()]
    );
}

// ---------------------------------------------------------------------------
// 5. Round transitions and timers
// ---------------------------------------------------------------------------

#[test]
fn new_round_closes_vote_and_resets_session() {
    let mut h = Harness::new(0);
    h.open();
    h.say("a", "!vote 1").unwrap();

    h.vote.on_new_game(MapId::new("Narva_Invasion_v1"));
    assert_eq!(h.vote.state(), LifecycleState::Idle);
    assert!(h.vote.session().nominations().is_empty());
    assert_eq!(h.vote.session().ballot_count(), 0);
    // only the new start delay is pending
    assert_eq!(h.scheduler.pending(), 1);

    h.advance(60);
    assert_eq!(h.vote.state(), LifecycleState::Collecting);
    assert_eq!(h.vote.session().tallies(), [0, 0, 0]);
}

#[test]
fn periodic_broadcast_repeats_while_collecting() {
    let mut h = Harness::new(0);
    h.open();
    assert_eq!(h.console.broadcasts().len(), 2);
    h.advance(90);
    assert_eq!(h.console.broadcasts().len(), 8);
}

#[test]
fn stale_timer_ids_are_ignored() {
    let mut h = Harness::new(0);
    h.vote.on_new_game(MapId::new("Kohat_RAAS_v1"));
    let stale = h.scheduler.advance(Duration::ZERO);
    assert!(stale.is_empty());

    // a second round start replaces the pending delay; firing an id the
    // lifecycle no longer owns must not open the vote early
    h.vote.on_new_game(MapId::new("Kohat_RAAS_v1"));
    h.vote.on_timer(mapvote_types::TimerId::new(1));
    assert_eq!(h.vote.state(), LifecycleState::Idle);
}

#[test]
fn restart_before_delay_supersedes_pending_start() {
    let mut h = Harness::new(0);
    h.vote.on_new_game(MapId::new("Kohat_RAAS_v1"));
    h.admin("root", "!vote restart").unwrap();
    assert_eq!(h.vote.state(), LifecycleState::Collecting);
    h.say("a", "!vote 2").unwrap();

    h.advance(60);
    assert_eq!(h.vote.session().tallies(), [0, 1, 0]);
    assert_eq!(
        h.vote.begin_voting(false).unwrap_err().to_string(),
        "voting is already enabled"
    );
}

#[test]
fn quorum_outcome_reports_counts() {
    let mut h = Harness::new(5);
    h.vote.on_new_game(MapId::new("Kohat_RAAS_v1"));
    h.join(2);
    assert_eq!(
        h.vote.begin_voting(false).unwrap(),
        StartOutcome::AwaitingQuorum {
            players: 2,
            needed: 5
        }
    );
}
