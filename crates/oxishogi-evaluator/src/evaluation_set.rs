//! The fixed position data a training run evaluates organisms against.
//!
//! An evaluation set is the narrow data interface to the game: board-state
//! generation, legal-move enumeration and feature extraction all happen
//! upstream, and their result is serialized here. Each position stores the
//! move the master played and, for every legal candidate move, the feature
//! vector of the position that candidate leads to, in schema order.
//!
//! The set is loaded once per run and shared read-only across evaluation
//! workers.

use derive_more as dm;
use serde::{Deserialize, Serialize};

use crate::feature::FeatureSchema;

/// Identifier of a move within its position's encoding, matching the ids
/// used by the upstream game-record pipeline.
pub type MoveId = u32;

/// One legal move from a training position, with the feature vector of the
/// resulting position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMove {
    #[serde(rename = "move")]
    pub move_id: MoveId,
    pub features: Vec<i32>,
}

/// A recorded position: the master's move and every legal candidate.
///
/// Candidate order is the upstream enumeration order; the one-ply selector's
/// tie-break depends on it, so it is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPosition {
    pub reference_move: MoveId,
    pub candidates: Vec<CandidateMove>,
}

/// The evaluation set fails structural validation.
#[derive(Debug, Clone, PartialEq, Eq, dm::Display, dm::Error)]
pub enum EvaluationSetError {
    #[display("evaluation set contains no positions")]
    NoPositions,
    #[display("position {index} has no candidate moves")]
    NoCandidates { index: usize },
    #[display(
        "position {index} candidate {candidate} carries {got} feature values, schema declares {expected}"
    )]
    CandidateArityMismatch {
        index: usize,
        candidate: usize,
        expected: usize,
        got: usize,
    },
}

/// A feature schema plus the training positions scored against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSet {
    pub schema: FeatureSchema,
    pub positions: Vec<TrainingPosition>,
}

impl EvaluationSet {
    /// Checks the structural invariants the scorer relies on: at least one
    /// position, at least one candidate per position, and every candidate
    /// feature vector matching the schema arity.
    ///
    /// Deserialization alone cannot guarantee these (the schema invariant is
    /// enforced by [`FeatureSchema`], the cross-references are not), so call
    /// this once after loading.
    pub fn validate(&self) -> Result<(), EvaluationSetError> {
        if self.positions.is_empty() {
            return Err(EvaluationSetError::NoPositions);
        }
        let expected = self.schema.num_features();
        for (index, position) in self.positions.iter().enumerate() {
            if position.candidates.is_empty() {
                return Err(EvaluationSetError::NoCandidates { index });
            }
            for (candidate, c) in position.candidates.iter().enumerate() {
                if c.features.len() != expected {
                    return Err(EvaluationSetError::CandidateArityMismatch {
                        index,
                        candidate,
                        expected,
                        got: c.features.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of training positions.
    #[must_use]
    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }

    /// Total candidate moves across all positions.
    #[must_use]
    pub fn num_candidates(&self) -> usize {
        self.positions.iter().map(|p| p.candidates.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureDef;

    fn two_feature_schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            FeatureDef::major("pawn_material"),
            FeatureDef::minor("mobility"),
        ])
        .unwrap()
    }

    #[test]
    fn test_valid_set_passes() {
        let set = EvaluationSet {
            schema: two_feature_schema(),
            positions: vec![TrainingPosition {
                reference_move: 7,
                candidates: vec![
                    CandidateMove {
                        move_id: 7,
                        features: vec![1, -2],
                    },
                    CandidateMove {
                        move_id: 9,
                        features: vec![0, 3],
                    },
                ],
            }],
        };
        set.validate().unwrap();
        assert_eq!(set.num_positions(), 1);
        assert_eq!(set.num_candidates(), 2);
    }

    #[test]
    fn test_rejects_empty_position_list() {
        let set = EvaluationSet {
            schema: two_feature_schema(),
            positions: vec![],
        };
        assert_eq!(set.validate().unwrap_err(), EvaluationSetError::NoPositions);
    }

    #[test]
    fn test_rejects_position_without_candidates() {
        let set = EvaluationSet {
            schema: two_feature_schema(),
            positions: vec![TrainingPosition {
                reference_move: 1,
                candidates: vec![],
            }],
        };
        assert_eq!(
            set.validate().unwrap_err(),
            EvaluationSetError::NoCandidates { index: 0 }
        );
    }

    #[test]
    fn test_rejects_arity_mismatch() {
        let set = EvaluationSet {
            schema: two_feature_schema(),
            positions: vec![TrainingPosition {
                reference_move: 1,
                candidates: vec![CandidateMove {
                    move_id: 1,
                    features: vec![4],
                }],
            }],
        };
        assert_eq!(
            set.validate().unwrap_err(),
            EvaluationSetError::CandidateArityMismatch {
                index: 0,
                candidate: 0,
                expected: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn test_set_round_trips_through_json() {
        let json = r#"{
            "schema": [
                {"label": "pawn_material", "class": "major"},
                {"label": "mobility", "class": "minor"}
            ],
            "positions": [
                {
                    "reference_move": 42,
                    "candidates": [
                        {"move": 42, "features": [100, -3]},
                        {"move": 43, "features": [99, 5]}
                    ]
                }
            ]
        }"#;
        let set: EvaluationSet = serde_json::from_str(json).unwrap();
        set.validate().unwrap();
        assert_eq!(set.schema.num_major_features(), 1);
        assert_eq!(set.positions[0].reference_move, 42);

        let text = serde_json::to_string(&set).unwrap();
        let back: EvaluationSet = serde_json::from_str(&text).unwrap();
        assert_eq!(back, set);
    }
}
