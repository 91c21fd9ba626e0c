//! Ballots and tallies.
//!
//! [`BallotBox`] keeps the per-voter ballots and the per-nomination counters
//! in lockstep: after every public call `tallies.len()` equals the number of
//! nominations and `sum(tallies) == ballots.len()`.

use crate::error::VoteError;
use mapvote_types::VoterId;
use std::collections::HashMap;

/// What a successful cast did to the tallies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastOutcome {
    /// The voter had no ballot before.
    First { index: usize },
    /// The voter moved their ballot.
    Changed { from: usize, to: usize },
    /// The voter repeated their current choice; tallies untouched.
    Unchanged { index: usize },
}

impl CastOutcome {
    /// Zero-based index the ballot now points at.
    pub fn index(&self) -> usize {
        match *self {
            Self::First { index } | Self::Unchanged { index } => index,
            Self::Changed { to, .. } => to,
        }
    }
}

/// One ballot per voter plus a counter per nomination.
#[derive(Clone, Debug, Default)]
pub struct BallotBox {
    tallies: Vec<u32>,
    ballots: HashMap<VoterId, usize>,
}

impl BallotBox {
    /// An empty box for `candidates` nominations, every tally at zero.
    pub fn new(candidates: usize) -> Self {
        Self {
            tallies: vec![0; candidates],
            ballots: HashMap::new(),
        }
    }

    /// Record `voter`'s ballot for the 1-based `display_choice`.
    ///
    /// Out-of-range choices are rejected without touching any state.
    pub fn cast(&mut self, voter: &VoterId, display_choice: i64) -> Result<CastOutcome, VoteError> {
        let out_of_range = || VoteError::ChoiceOutOfRange {
            choice: display_choice,
            available: self.tallies.len(),
        };
        let index = display_choice
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .filter(|&i| i < self.tallies.len())
            .ok_or_else(out_of_range)?;

        let outcome = match self.ballots.insert(voter.clone(), index) {
            None => {
                self.tallies[index] += 1;
                CastOutcome::First { index }
            }
            Some(previous) if previous == index => CastOutcome::Unchanged { index },
            Some(previous) => {
                self.tallies[previous] -= 1;
                self.tallies[index] += 1;
                CastOutcome::Changed {
                    from: previous,
                    to: index,
                }
            }
        };
        Ok(outcome)
    }

    /// Withdraw `voter`'s ballot. Returns the index it pointed at, if any.
    pub fn retract(&mut self, voter: &VoterId) -> Option<usize> {
        let index = self.ballots.remove(voter)?;
        self.tallies[index] -= 1;
        Some(index)
    }

    /// Withdraw every ballot whose voter does not satisfy `keep`.
    /// Returns how many ballots were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&VoterId) -> bool) -> usize {
        let absent: Vec<VoterId> = self
            .ballots
            .keys()
            .filter(|voter| !keep(voter))
            .cloned()
            .collect();
        for voter in &absent {
            self.retract(voter);
        }
        absent.len()
    }

    pub fn tallies(&self) -> &[u32] {
        &self.tallies
    }

    /// Zero-based choice currently held by `voter`.
    pub fn ballot_of(&self, voter: &VoterId) -> Option<usize> {
        self.ballots.get(voter).copied()
    }

    /// Number of live ballots.
    pub fn ballot_count(&self) -> usize {
        self.ballots.len()
    }

    /// Indices sharing the highest tally.
    pub fn winners(&self) -> Vec<usize> {
        winners(&self.tallies)
    }
}

/// Indices of every tally equal to the global maximum, in ascending order.
///
/// Every index ties while all tallies are zero; an empty slice has no
/// winners.
pub fn winners(tallies: &[u32]) -> Vec<usize> {
    let mut ties = Vec::new();
    let mut highest = None;
    for (index, &score) in tallies.iter().enumerate() {
        match highest {
            Some(best) if score < best => continue,
            Some(best) if score == best => ties.push(index),
            _ => {
                highest = Some(score);
                ties.clear();
                ties.push(index);
            }
        }
    }
    ties
}
