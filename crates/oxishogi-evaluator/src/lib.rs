//! Evaluation of candidate heuristics against recorded master games.
//!
//! This crate is the boundary between the evolutionary search and the game
//! itself. The search never generates board states, enumerates legal moves
//! or computes positional features — all of that arrives pre-computed as an
//! [`EvaluationSet`](evaluation_set::EvaluationSet): a fixed collection of
//! training positions, each carrying its legal candidate moves with the
//! feature vector of the position each candidate leads to, plus the move the
//! master actually played.
//!
//! # Architecture
//!
//! ```text
//! Organism Evaluation (fitness of one weight vector)
//!     ↓ scores every training position via
//! One-Ply Move Selection (argmax of the weighted feature sum)
//!     ↓ reads
//! Evaluation Set (positions + candidates + feature vectors, loaded once)
//! ```
//!
//! # Scoring protocol
//!
//! For one weight vector, every training position is scored by computing
//! `H(candidate) = Σ weightᵢ × featureᵢ` for each legal candidate move and
//! selecting the candidate with the maximum value (first maximum wins — see
//! [`organism_evaluator`] for the exact tie-break contract). A position
//! counts as *correct* when the selected move is the master's move, and the
//! organism's fitness is `correct²` — squared so that roulette selection
//! separates strong heuristics from mediocre ones super-linearly.
//!
//! # Modules
//!
//! - [`feature`] - Declared, ordered feature schema with major/minor classes
//! - [`evaluation_set`] - The position data the evaluator runs against
//! - [`organism_evaluator`] - The [`OrganismEvaluator`] capability and its
//!   reference-match implementation
//!
//! [`OrganismEvaluator`]: organism_evaluator::OrganismEvaluator

pub mod evaluation_set;
pub mod feature;
pub mod organism_evaluator;

pub use self::{
    evaluation_set::EvaluationSet,
    feature::{FeatureClass, FeatureDef, FeatureSchema},
    organism_evaluator::{EvaluationError, OrganismEvaluator, ReferenceMatchEvaluator},
};
