//! Per-round vote statistics.

use std::collections::BTreeMap;
use std::fmt;

/// Things worth counting while a vote runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VoteStat {
    /// A ballot was accepted (first vote or change).
    Cast,
    /// An accepted ballot replaced an earlier different choice.
    Changed,
    /// A ballot was rejected as out of range.
    Rejected,
    /// A ballot was withdrawn because its voter left.
    Retracted,
    /// A vote opened (nominations published).
    Opened,
}

impl VoteStat {
    pub const ALL: [VoteStat; 5] = [
        Self::Cast,
        Self::Changed,
        Self::Rejected,
        Self::Retracted,
        Self::Opened,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cast => "cast",
            Self::Changed => "changed",
            Self::Rejected => "rejected",
            Self::Retracted => "retracted",
            Self::Opened => "opened",
        }
    }
}

/// Counter set for [`VoteStat`]s.
///
/// Owned by the single-threaded lifecycle, so plain integers suffice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoteStats {
    counters: BTreeMap<VoteStat, u64>,
}

impl VoteStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, stat: VoteStat) {
        *self.counters.entry(stat).or_insert(0) += 1;
    }

    pub fn get(&self, stat: VoteStat) -> u64 {
        self.counters.get(&stat).copied().unwrap_or(0)
    }

    /// Return the current counts and zero every counter.
    pub fn take(&mut self) -> VoteStats {
        std::mem::take(self)
    }
}

impl fmt::Display for VoteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for stat in VoteStat::ALL {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}={}", stat.name(), self.get(stat))?;
        }
        Ok(())
    }
}
