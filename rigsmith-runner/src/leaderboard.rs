//! Build leaderboard: bounded, sorted by score.
//!
//! Holds the top N scored builds of one sampling run. Entries carry the trial
//! that produced them so equal scores keep trial order.

use serde::{Deserialize, Serialize};

use rigsmith_core::Build;

/// A single entry in the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub build: Build,
    pub score: f64,
    pub trial: u64,
}

/// Outcome of an insert operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// New entry added to the leaderboard.
    Inserted,
    /// Skipped: board full and not better than the worst, or non-finite score.
    Skipped,
}

/// Top N builds ranked by score, best first.
#[derive(Debug)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    max_size: usize,
}

impl Leaderboard {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Insert an entry. Returns the outcome.
    ///
    /// Entries must arrive in trial order: an entry that only ties the worst
    /// one of a full board is skipped, so earlier trials win ties.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> InsertResult {
        if !entry.score.is_finite() {
            return InsertResult::Skipped;
        }

        if self.entries.len() < self.max_size {
            self.entries.push(entry);
            self.sort_entries();
            InsertResult::Inserted
        } else if let Some(worst) = self.entries.last() {
            if entry.score > worst.score {
                self.entries.pop();
                self.entries.push(entry);
                self.sort_entries();
                InsertResult::Inserted
            } else {
                InsertResult::Skipped
            }
        } else {
            // max_size 0
            InsertResult::Skipped
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranked builds, best first.
    pub fn into_builds(self) -> Vec<Build> {
        self.entries.into_iter().map(|e| e.build).collect()
    }

    fn sort_entries(&mut self) {
        // Stable: equal scores stay in insertion order.
        self.entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rigsmith_core::Budget;
    use std::collections::BTreeMap;

    fn make_entry(score: f64, trial: u64) -> LeaderboardEntry {
        let budget = Budget::new(1000.0).unwrap();
        let build = Build::new(format!("Sample #{trial}"), budget, BTreeMap::new()).with_score(score);
        LeaderboardEntry { build, score, trial }
    }

    fn trials(lb: &Leaderboard) -> Vec<u64> {
        lb.entries().iter().map(|e| e.trial).collect()
    }

    #[test]
    fn sorted_descending() {
        let mut lb = Leaderboard::new(10);
        lb.insert(make_entry(0.5, 0));
        lb.insert(make_entry(2.0, 1));
        lb.insert(make_entry(1.0, 2));
        assert_eq!(trials(&lb), vec![1, 2, 0]);
    }

    #[test]
    fn bounded_size_evicts_worst() {
        let mut lb = Leaderboard::new(2);
        assert_eq!(lb.insert(make_entry(1.0, 0)), InsertResult::Inserted);
        assert_eq!(lb.insert(make_entry(2.0, 1)), InsertResult::Inserted);
        assert_eq!(lb.insert(make_entry(3.0, 2)), InsertResult::Inserted);
        assert_eq!(lb.insert(make_entry(0.5, 3)), InsertResult::Skipped);
        assert_eq!(trials(&lb), vec![2, 1]);
    }

    #[test]
    fn ties_keep_earlier_trial() {
        let mut lb = Leaderboard::new(2);
        lb.insert(make_entry(1.0, 0));
        lb.insert(make_entry(1.0, 1));
        assert_eq!(lb.insert(make_entry(1.0, 2)), InsertResult::Skipped);
        assert_eq!(trials(&lb), vec![0, 1]);
    }

    #[test]
    fn rejects_non_finite() {
        let mut lb = Leaderboard::new(3);
        assert_eq!(lb.insert(make_entry(f64::NAN, 0)), InsertResult::Skipped);
        assert_eq!(lb.insert(make_entry(f64::INFINITY, 1)), InsertResult::Skipped);
        assert!(lb.is_empty());
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut lb = Leaderboard::new(0);
        assert_eq!(lb.insert(make_entry(1.0, 0)), InsertResult::Skipped);
        assert!(lb.into_builds().is_empty());
    }
}
