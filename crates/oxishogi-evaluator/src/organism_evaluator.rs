//! Organism evaluation: scoring a decoded weight vector against the
//! evaluation set.
//!
//! # The capability boundary
//!
//! The evolution loop consumes the [`OrganismEvaluator`] trait and nothing
//! else: it hands over a weight vector and receives an integer fitness. The
//! trait also exposes the feature counts the run controller needs to size
//! chromosomes, and the labels reporting wants. Implementations must be
//! deterministic — the loop caches fitness per chromosome and re-evaluation
//! must reproduce the cached score exactly.
//!
//! # One-ply selection
//!
//! [`ReferenceMatchEvaluator`] scores one position by computing the
//! heuristic value `H(candidate) = Σ weightᵢ × featureᵢ` for every legal
//! candidate in stored order and keeping the first candidate whose value is
//! *strictly greater* than the best seen so far. A later candidate with an
//! equal value never displaces the incumbent; the first maximum in
//! enumeration order wins. This mirrors the recorded games the set was
//! built from and is part of the scoring contract — do not relax it to `>=`.
//!
//! # Fitness
//!
//! A position is *correct* when the selected move equals the master's move;
//! the organism's fitness is `correct²`. The square is deliberate: under
//! fitness-proportionate selection it separates heuristics that are correct
//! on many positions from mediocre ones super-linearly.

use std::fmt;

use derive_more as dm;

use crate::evaluation_set::{CandidateMove, EvaluationSet, MoveId};

/// The evaluation capability failed. Propagated to the caller — a failed
/// organism is never silently scored zero, since that would corrupt
/// selection pressure and statistics.
#[derive(Debug, Clone, PartialEq, Eq, dm::Display, dm::Error)]
pub enum EvaluationError {
    /// The decoded weight vector does not match the schema arity.
    #[display("weight vector carries {got} weights, evaluation set declares {expected} features")]
    WeightCountMismatch { expected: usize, got: usize },
    /// A position limit outside the available data.
    #[display("position limit {limit} outside 1..={available}")]
    InvalidPositionLimit { limit: usize, available: usize },
}

/// Scores decoded weight vectors; the only game-facing capability the
/// evolution loop depends on.
pub trait OrganismEvaluator: fmt::Debug + Send + Sync {
    /// Scores one weight vector. Deterministic for a fixed evaluation set;
    /// higher is better.
    fn evaluate(&self, weights: &[u32]) -> Result<u64, EvaluationError>;

    /// Total number of features a weight vector must carry.
    fn num_features(&self) -> usize;

    /// Number of leading major (wide-segment) features.
    fn num_major_features(&self) -> usize;

    /// Feature labels in weight-vector order, for reporting.
    fn feature_labels(&self) -> Vec<String>;
}

/// Counters from one scoring pass, for the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Positions examined (after any position limit).
    pub positions: usize,
    /// Candidate moves whose heuristic value was computed.
    pub candidates_scanned: usize,
    /// Positions where the selected move matched the master's move.
    pub correct: usize,
}

/// Evaluates organisms by replaying recorded master positions one ply deep.
#[derive(Debug)]
pub struct ReferenceMatchEvaluator {
    set: EvaluationSet,
    limit: usize,
}

impl ReferenceMatchEvaluator {
    /// Wraps a validated evaluation set. All positions are scored by
    /// default; see [`set_position_limit`](Self::set_position_limit).
    #[must_use]
    pub fn new(set: EvaluationSet) -> Self {
        let limit = set.num_positions();
        Self { set, limit }
    }

    /// Restricts scoring to the first `limit` positions of the set.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::InvalidPositionLimit`] when `limit` is
    /// zero or exceeds the available positions.
    pub fn set_position_limit(&mut self, limit: usize) -> Result<(), EvaluationError> {
        let available = self.set.num_positions();
        if limit == 0 || limit > available {
            return Err(EvaluationError::InvalidPositionLimit { limit, available });
        }
        self.limit = limit;
        Ok(())
    }

    /// Positions scored per evaluation.
    #[must_use]
    pub fn position_limit(&self) -> usize {
        self.limit
    }

    /// The evaluation set this evaluator scores against.
    #[must_use]
    pub fn evaluation_set(&self) -> &EvaluationSet {
        &self.set
    }

    /// Scores a weight vector and reports the per-pass counters alongside
    /// the fitness.
    pub fn evaluate_with_report(
        &self,
        weights: &[u32],
    ) -> Result<(u64, EvaluationReport), EvaluationError> {
        let expected = self.set.schema.num_features();
        if weights.len() != expected {
            return Err(EvaluationError::WeightCountMismatch {
                expected,
                got: weights.len(),
            });
        }

        let mut correct = 0_usize;
        let mut candidates_scanned = 0_usize;
        for position in &self.set.positions[..self.limit] {
            candidates_scanned += position.candidates.len();
            if select_move(&position.candidates, weights) == Some(position.reference_move) {
                correct += 1;
            }
        }

        let score = (correct as u64).pow(2);
        Ok((
            score,
            EvaluationReport {
                positions: self.limit,
                candidates_scanned,
                correct,
            },
        ))
    }
}

impl OrganismEvaluator for ReferenceMatchEvaluator {
    fn evaluate(&self, weights: &[u32]) -> Result<u64, EvaluationError> {
        self.evaluate_with_report(weights).map(|(score, _)| score)
    }

    fn num_features(&self) -> usize {
        self.set.schema.num_features()
    }

    fn num_major_features(&self) -> usize {
        self.set.schema.num_major_features()
    }

    fn feature_labels(&self) -> Vec<String> {
        self.set.schema.labels()
    }
}

/// One-ply search over a position's candidates: the first candidate holding
/// the maximum heuristic value wins (strict `>`, encounter order).
fn select_move(candidates: &[CandidateMove], weights: &[u32]) -> Option<MoveId> {
    let mut best: Option<(MoveId, i64)> = None;
    for candidate in candidates {
        let value = heuristic_value(candidate, weights);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((candidate.move_id, value)),
        }
    }
    best.map(|(move_id, _)| move_id)
}

/// The weighted linear feature combination `Σ weightᵢ × featureᵢ`.
fn heuristic_value(candidate: &CandidateMove, weights: &[u32]) -> i64 {
    candidate
        .features
        .iter()
        .zip(weights)
        .map(|(&feature, &weight)| i64::from(feature) * i64::from(weight))
        .sum()
}
