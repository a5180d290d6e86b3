//! Generational evolutionary search over Gray-coded weight chromosomes.
//!
//! This crate implements the search engine that breeds feature weightings
//! for the one-ply evaluator: bit-string individuals with cached fitness,
//! the genetic operators, and the generational loop with elitism.
//!
//! # How a run works
//!
//! 1. **Population** - Build `POP_SIZE` individuals with random chromosomes
//! 2. **Evaluation** - Decode each chromosome to a weight vector and score
//!    it through the injected [`OrganismEvaluator`]
//! 3. **Selection** - Roulette-select `POP_SIZE − 1` survivors, cloning them
//! 4. **Variation** - Uniform crossover on adjacent pairs, then per-bit
//!    mutation; both may hit the same individual
//! 5. **Elitism** - The best pre-variation individual re-enters unchanged
//! 6. **Repeat** - For a fixed number of generations; no early stop
//!
//! # Fitness caching
//!
//! An individual's fitness is either valid (the score of the current
//! chromosome) or invalid (the chromosome changed since it was scored).
//! Only invalid individuals are re-evaluated each generation. This is a
//! correctness property, not just a performance one: evaluation is pure, so
//! a cached score and a recomputed score are interchangeable, and the
//! `nevals` column of the logbook reports exactly how many organisms were
//! scored.
//!
//! # Parallel evaluation
//!
//! Evaluating different individuals shares no mutable state, so the
//! evaluation step fans out across scoped threads — one task per invalid
//! individual, each writing only its own fitness slot. Results rejoin in
//! offspring order regardless of completion order.
//!
//! # Modules
//!
//! - [`population`] - [`Individual`], [`Population`] and the hall of fame
//! - [`operators`] - selection, crossover, mutation
//! - [`logbook`] - per-generation statistics records
//! - [`evolution`] - the generational driver and its collaborator traits
//!
//! [`OrganismEvaluator`]: oxishogi_evaluator::OrganismEvaluator
//! [`Individual`]: population::Individual
//! [`Population`]: population::Population

pub mod evolution;
pub mod logbook;
pub mod operators;
pub mod population;

pub use self::{
    evolution::{
        EvolutionDriver, EvolveError, GeneConstraint, GenerationParams, ProgressSink, RecordSink,
    },
    logbook::{GenerationRecord, Logbook},
    operators::SelectionError,
    population::{HallOfFame, Individual, Population},
};
