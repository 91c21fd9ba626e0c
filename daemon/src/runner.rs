//! The dispatch loop: one task owns the [`MapVote`] and applies events in
//! arrival order.

use crate::event::{InboundEvent, LoopEvent};
use mapvote_engine::{ChatMessage, MapVote};
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Drain `events` into `vote` until input closes or shutdown is requested.
/// Any running vote is closed on the way out.
pub async fn run(mut vote: MapVote, mut events: mpsc::UnboundedReceiver<LoopEvent>) -> MapVote {
    while let Some(event) = events.recv().await {
        match event {
            LoopEvent::Inbound(inbound) => dispatch(&mut vote, inbound),
            LoopEvent::Timer(id) => vote.on_timer(id),
            LoopEvent::InputClosed => {
                info!("transport input closed");
                break;
            }
            LoopEvent::Shutdown => {
                info!("shutdown requested");
                break;
            }
        }
    }
    vote.end_voting();
    info!(stats = %vote.stats(), "dispatch loop stopped");
    vote
}

fn dispatch(vote: &mut MapVote, event: InboundEvent) {
    match event {
        InboundEvent::NewGame { map } => vote.on_new_game(map),
        InboundEvent::PlayerConnected { player } => vote.on_player_connected(player),
        InboundEvent::PlayerDisconnected { player } => vote.on_player_disconnected(&player),
        InboundEvent::Players { players } => vote.sync_players(players),
        InboundEvent::Chat {
            player,
            name,
            message,
            admin,
        } => {
            let chat = ChatMessage {
                voter: player,
                name,
                text: message,
                admin,
            };
            if let Err(e) = vote.on_chat(&chat) {
                debug!(voter = %chat.voter, "chat command rejected: {e}");
            }
        }
    }
}

/// Read JSON-lines events from `input` and forward them. Malformed lines are
/// logged and skipped; end of input is forwarded as [`LoopEvent::InputClosed`].
///
/// Blocking; run it on its own thread.
pub fn read_events<R: BufRead>(input: R, events: mpsc::UnboundedSender<LoopEvent>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("transport read failed: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<InboundEvent>(line) {
            Ok(event) => {
                if events.send(LoopEvent::Inbound(event)).is_err() {
                    return;
                }
            }
            Err(e) => warn!("skipping malformed event: {e}"),
        }
    }
    let _ = events.send(LoopEvent::InputClosed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapvote_catalog::LayerCatalog;
    use mapvote_engine::VoteConfig;
    use mapvote_nullables::{ManualScheduler, NullConsole, StaticRuleSource};
    use mapvote_types::{LifecycleState, MapId, VoterId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    const RULES: &str = r#"{
        "rules": {
            "default": [
                {"map": "Narva", "modes": ["RAAS"], "versions": ["v1"]},
                {"map": "Mestia", "modes": ["AAS"], "versions": ["v1"]}
            ]
        },
        "modes": ["RAAS", "AAS"]
    }"#;

    fn build_vote(console: &NullConsole, scheduler: &ManualScheduler) -> MapVote {
        let config = VoteConfig {
            min_players_for_vote: 0,
            start_delay_secs: 1,
            ..Default::default()
        };
        MapVote::new(
            config,
            Box::new(StaticRuleSource::from_json(RULES)),
            Arc::new(LayerCatalog::new([
                "Narva_RAAS_v1",
                "Mestia_AAS_v1",
                "Kohat_RAAS_v1",
            ])),
            Box::new(console.clone()),
            Box::new(scheduler.clone()),
        )
        .with_rng(StdRng::seed_from_u64(7))
    }

    #[tokio::test]
    async fn transport_lines_drive_the_vote() {
        let console = NullConsole::new();
        let scheduler = ManualScheduler::new();
        let vote = build_vote(&console, &scheduler);

        let input = [
            r#"{"type": "new_game", "map": "Kohat_RAAS_v1"}"#,
            "not json",
            "",
            r#"{"type": "player_connected", "player": "1"}"#,
            r#"{"type": "chat", "player": "0", "name": "root", "message": "!vote restart", "admin": true}"#,
            r#"{"type": "chat", "player": "1", "name": "one", "message": "!vote 2"}"#,
        ]
        .join("\n");
        let (tx, rx) = mpsc::unbounded_channel();
        read_events(input.as_bytes(), tx);

        let vote = run(vote, rx).await;
        assert_eq!(vote.current_map(), Some(&MapId::new("Kohat_RAAS_v1")));
        assert_eq!(vote.player_count(), 1);
        assert_eq!(vote.state(), LifecycleState::Closed);
        assert_eq!(vote.session().tallies(), &[0, 1]);
        assert_eq!(
            console.warnings_to(&VoterId::new("1")),
            vec!["you voted for Mestia_AAS_v1".to_string()]
        );
        assert_eq!(console.last_next_map(), Some(MapId::new("Mestia_AAS_v1")));
        // start delay and periodic broadcast both cancelled
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let console = NullConsole::new();
        let scheduler = ManualScheduler::new();
        let vote = build_vote(&console, &scheduler);

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(LoopEvent::Inbound(InboundEvent::NewGame {
            map: MapId::new("Kohat_RAAS_v1"),
        }))
        .unwrap();
        tx.send(LoopEvent::Shutdown).unwrap();
        tx.send(LoopEvent::Inbound(InboundEvent::PlayerConnected {
            player: VoterId::new("late"),
        }))
        .unwrap();

        let vote = run(vote, rx).await;
        assert_eq!(vote.current_map(), Some(&MapId::new("Kohat_RAAS_v1")));
        assert_eq!(vote.player_count(), 0);
        assert_eq!(vote.state(), LifecycleState::Idle);
    }
}
