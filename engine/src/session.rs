//! Per-round vote state.
//!
//! A [`VoteSession`] is owned by the lifecycle and replaced wholesale on every
//! reset; nothing outlives the round it was created for.

use crate::error::VoteError;
use crate::tally::{BallotBox, CastOutcome};
use mapvote_types::{LifecycleState, MapId, VoterId};
use rand::seq::SliceRandom;
use rand::Rng;

/// A ballot accepted by [`VoteSession::cast_vote`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptedVote {
    pub nomination: MapId,
    pub outcome: CastOutcome,
}

/// One row of the standings: display position, map, votes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Standing<'a> {
    pub index: usize,
    pub nomination: &'a MapId,
    pub votes: u32,
}

#[derive(Clone, Debug, Default)]
pub struct VoteSession {
    nominations: Vec<MapId>,
    ballots: BallotBox,
    state: LifecycleState,
}

impl VoteSession {
    /// An empty session waiting for the vote to open.
    pub fn idle() -> Self {
        Self::default()
    }

    /// A session accepting ballots for `nominations`, all tallies at zero.
    pub fn collecting(nominations: Vec<MapId>) -> Self {
        Self {
            ballots: BallotBox::new(nominations.len()),
            nominations,
            state: LifecycleState::Collecting,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        self.state.is_collecting()
    }

    /// Move between the non-collecting states, or close a collecting session.
    ///
    /// Entering `Collecting` always goes through [`VoteSession::collecting`]
    /// so that nominations and tallies are rebuilt together.
    pub(crate) fn transition(&mut self, to: LifecycleState) -> Result<(), VoteError> {
        use LifecycleState::*;
        let allowed = matches!(
            (self.state, to),
            (Idle | AwaitingQuorum | Closed, AwaitingQuorum)
                | (Idle | AwaitingQuorum | Collecting, Closed)
                | (Closed, Closed)
        );
        if !allowed {
            return Err(VoteError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        if self.state != to {
            tracing::debug!(from = %self.state, to = %to, "vote session transition");
        }
        self.state = to;
        Ok(())
    }

    /// Stop accepting ballots. Valid from every state.
    pub(crate) fn close(&mut self) {
        if self.state != LifecycleState::Closed {
            tracing::debug!(from = %self.state, "vote session closed");
        }
        self.state = LifecycleState::Closed;
    }

    pub fn nominations(&self) -> &[MapId] {
        &self.nominations
    }

    /// Tallies, parallel with [`VoteSession::nominations`].
    pub fn tallies(&self) -> &[u32] {
        self.ballots.tallies()
    }

    pub fn ballot_count(&self) -> usize {
        self.ballots.ballot_count()
    }

    pub fn ballot_of(&self, voter: &VoterId) -> Option<&MapId> {
        self.ballots
            .ballot_of(voter)
            .map(|index| &self.nominations[index])
    }

    /// Record a ballot for the 1-based `display_choice`.
    pub fn cast_vote(&mut self, voter: &VoterId, display_choice: i64) -> Result<AcceptedVote, VoteError> {
        if !self.is_collecting() {
            return Err(VoteError::NoActiveVote);
        }
        let outcome = self.ballots.cast(voter, display_choice)?;
        Ok(AcceptedVote {
            nomination: self.nominations[outcome.index()].clone(),
            outcome,
        })
    }

    /// Withdraw a ballot; returns the nomination it was for.
    pub fn retract(&mut self, voter: &VoterId) -> Option<&MapId> {
        let index = self.ballots.retract(voter)?;
        Some(&self.nominations[index])
    }

    /// Withdraw every ballot whose voter is not in `present`.
    pub fn retain_voters(&mut self, present: impl Fn(&VoterId) -> bool) -> usize {
        self.ballots.retain(present)
    }

    /// Nominations sharing the highest tally, in display order.
    pub fn winners(&self) -> Vec<&MapId> {
        self.ballots
            .winners()
            .into_iter()
            .map(|index| &self.nominations[index])
            .collect()
    }

    /// Draw one winner uniformly from the current winner set.
    ///
    /// Not cached: two draws over the same tallies may differ while tied.
    pub fn draw_winner<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&MapId> {
        self.winners().choose(rng).copied()
    }

    /// Nominations in display order.
    pub fn choices(&self) -> Vec<Standing<'_>> {
        self.nominations
            .iter()
            .zip(self.tallies())
            .enumerate()
            .map(|(index, (nomination, &votes))| Standing {
                index,
                nomination,
                votes,
            })
            .collect()
    }

    /// Nominations ordered by votes, highest first; ties keep display order.
    pub fn standings(&self) -> Vec<Standing<'_>> {
        let mut rows = self.choices();
        rows.sort_by(|a, b| b.votes.cmp(&a.votes).then(a.index.cmp(&b.index)));
        rows
    }
}
