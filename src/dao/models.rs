use std::cmp::Ordering;

use serde::Serialize;

use crate::points::PointGrant;

/// Accumulated score of a single tracked identity.
///
/// The identity is fixed at construction; the score only moves through the
/// clamped add operations so it never drops below zero.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct ScoreRecord {
    identity: String,
    score: i64,
}

impl ScoreRecord {
    /// Fresh record with a score of zero.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            score: 0,
        }
    }

    /// Rebuild a record from persisted values. Negative scores are clamped to zero.
    pub fn with_score(identity: impl Into<String>, score: i64) -> Self {
        Self {
            identity: identity.into(),
            score: score.max(0),
        }
    }

    /// Stable key of the tracked player.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Current score, never negative.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Apply the delta carried by `grant`.
    pub fn apply(&mut self, grant: &PointGrant) {
        self.score = grant.apply(self.score);
    }

    /// Add a raw delta, clamping the result at zero.
    pub fn add_points(&mut self, delta: i64) {
        self.score = clamped_add(self.score, delta);
    }

    /// Drop the score back to zero.
    pub fn reset_points(&mut self) {
        self.score = 0;
    }
}

/// `max(0, score + delta)` without overflowing at the `i64` bounds.
pub(crate) fn clamped_add(score: i64, delta: i64) -> i64 {
    score.saturating_add(delta).max(0)
}

/// Ranking order: highest score first, identity ascending on ties.
pub fn ranking_order(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.identity.cmp(&b.identity))
}
