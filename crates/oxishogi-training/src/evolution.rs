//! The generational evolution driver.
//!
//! One driver owns the run-wide bookkeeping (hall of fame, logbook) and
//! borrows its collaborators: the organism evaluator, the Gray encoder and
//! the seeded random source. A run moves through
//!
//! ```text
//! INITIALIZED → EVALUATING(gen 0) → [SELECTING → VARYING → EVALUATING → RECORDING]* → TERMINATED
//! ```
//!
//! terminating after exactly the configured number of generations — there
//! is no convergence-based early stop.
//!
//! # Elitism
//!
//! Each generation clones the best current individual before selection and
//! appends it unchanged to the varied offspring, which were deliberately
//! selected one short. The best fitness in the population therefore never
//! regresses between generations.
//!
//! # Pinned genes
//!
//! A [`GeneConstraint`] forces a contiguous bit range of every chromosome to
//! a constant pattern. It is applied to the initial population and to every
//! offspring generation before the evaluation step, so a cached fitness
//! always describes the pinned chromosome. Pinning one wide segment to a
//! known weight anchors the scale every other weight is measured against.

use std::{iter, thread, time::Instant};

use derive_more as dm;
use rand::Rng;

use oxishogi_encoding::{GrayEncoder, MalformedChromosomeError};
use oxishogi_evaluator::{EvaluationError, OrganismEvaluator};

use crate::{
    logbook::{GenerationRecord, Logbook},
    operators::{self, SelectionError},
    population::{HallOfFame, Individual, Population},
};

/// A training run failed. All variants are fatal: skipping an individual
/// would break the population-size invariant, and retrying cannot help
/// since evaluation is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, dm::Display, dm::Error)]
pub enum EvolveError {
    /// A chromosome did not decode against the encoder's segment layout.
    #[display("chromosome decoding failed: {_0}")]
    Chromosome(MalformedChromosomeError),
    /// The evaluation capability rejected an organism.
    #[display("organism evaluation failed: {_0}")]
    Evaluation(EvaluationError),
    /// Roulette selection was undefined for the population.
    #[display("selection failed: {_0}")]
    Selection(SelectionError),
    /// The pinned-gene range does not fit the chromosome.
    #[display("pinned gene range {start}..{end} exceeds chromosome length {len}")]
    ConstraintOutOfRange {
        start: usize,
        end: usize,
        len: usize,
    },
}

impl From<MalformedChromosomeError> for EvolveError {
    fn from(err: MalformedChromosomeError) -> Self {
        Self::Chromosome(err)
    }
}

impl From<EvaluationError> for EvolveError {
    fn from(err: EvaluationError) -> Self {
        Self::Evaluation(err)
    }
}

impl From<SelectionError> for EvolveError {
    fn from(err: SelectionError) -> Self {
        Self::Selection(err)
    }
}

/// Variation probabilities for one run, fixed across generations.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    /// Probability of crossing over each adjacent offspring pair.
    pub crossover_prob: f64,
    /// Per-bit swap probability within an applied crossover.
    pub swap_prob: f64,
    /// Per-bit flip probability of mutation.
    pub mutation_prob: f64,
}

/// A contiguous chromosome range pinned to a constant bit pattern.
#[derive(Debug, Clone)]
pub struct GeneConstraint {
    start: usize,
    bits: Vec<bool>,
}

impl GeneConstraint {
    /// Pins `bits` starting at bit offset `start`.
    #[must_use]
    pub fn new(start: usize, bits: Vec<bool>) -> Self {
        Self { start, bits }
    }

    /// First pinned bit offset.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last pinned bit offset.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.bits.len()
    }

    /// Forces the pinned range on one individual, invalidating its fitness
    /// if any bit actually changed.
    fn apply_to(&self, individual: &mut Individual) {
        let mut changed = false;
        {
            let range = &mut individual.bits_mut()[self.start..self.end()];
            for (bit, &pinned) in range.iter_mut().zip(&self.bits) {
                if *bit != pinned {
                    *bit = pinned;
                    changed = true;
                }
            }
        }
        if changed {
            individual.invalidate_fitness();
        }
    }
}

/// Observational progress reporting; has no effect on the algorithm.
pub trait ProgressSink {
    /// The run is about to start.
    fn start(&mut self);
    /// Generation `generation` just completed.
    fn update(&mut self, generation: usize);
    /// The run finished.
    fn finish(&mut self);
}

/// Receives each generation's compiled statistics record as it is written
/// to the logbook.
pub trait RecordSink {
    fn record(&mut self, record: &GenerationRecord);
}

/// Progress sink that reports nowhere, for headless runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start(&mut self) {}
    fn update(&mut self, _generation: usize) {}
    fn finish(&mut self) {}
}

/// Record sink that drops every record, for headless runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardRecords;

impl RecordSink for DiscardRecords {
    fn record(&mut self, _record: &GenerationRecord) {}
}

/// Drives the generational loop against an injected evaluator.
///
/// Everything stochastic draws from the single `rng` passed at
/// construction, so a fixed seed reproduces a run bit for bit.
#[derive(Debug)]
pub struct EvolutionDriver<'a, E: ?Sized, R> {
    evaluator: &'a E,
    encoder: &'a GrayEncoder,
    params: GenerationParams,
    constraint: Option<GeneConstraint>,
    rng: R,
    hall_of_fame: HallOfFame,
    logbook: Logbook,
}

impl<'a, E, R> EvolutionDriver<'a, E, R>
where
    E: OrganismEvaluator + ?Sized,
    R: Rng,
{
    /// Creates a driver over the given collaborators.
    pub fn new(
        evaluator: &'a E,
        encoder: &'a GrayEncoder,
        params: GenerationParams,
        rng: R,
    ) -> Self {
        Self {
            evaluator,
            encoder,
            params,
            constraint: None,
            rng,
            hall_of_fame: HallOfFame::new(),
            logbook: Logbook::new(),
        }
    }

    /// Adds a pinned-gene constraint to the run.
    #[must_use]
    pub fn with_constraint(mut self, constraint: GeneConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// The best individual observed so far.
    #[must_use]
    pub fn hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    /// The per-generation statistics collected so far.
    #[must_use]
    pub fn logbook(&self) -> &Logbook {
        &self.logbook
    }

    /// Runs `generations` generational replacements over `population`.
    ///
    /// Generation 0 evaluates the initial population; each following
    /// generation selects, varies, re-evaluates only changed individuals
    /// and restores the elitist. The population holds exactly its original
    /// size when this returns.
    ///
    /// # Errors
    ///
    /// Any chromosome, evaluation or selection failure aborts the run; the
    /// population is left in its last consistent state.
    pub fn run(
        &mut self,
        population: &mut Population,
        generations: usize,
        progress: &mut dyn ProgressSink,
        records: &mut dyn RecordSink,
    ) -> Result<(), EvolveError> {
        self.check_constraint(population)?;
        progress.start();
        let mut gen_start = Instant::now();

        if let Some(constraint) = &self.constraint {
            for individual in population.individuals_mut() {
                constraint.apply_to(individual);
            }
        }
        let evaluations =
            evaluate_invalid(self.encoder, self.evaluator, population.individuals_mut())?;
        self.hall_of_fame.update(population.individuals());
        self.record(0, evaluations, &mut gen_start, population, records);

        for generation in 1..=generations {
            // The elitist is cloned before selection so it survives the
            // generation untouched by variation.
            let elitist = population.best().clone();

            // One slot short: the elitist takes it back below.
            let mut offspring = operators::select_roulette(
                population.individuals(),
                population.len() - 1,
                &mut self.rng,
            )?;
            operators::vary(
                &mut offspring,
                self.params.crossover_prob,
                self.params.swap_prob,
                self.params.mutation_prob,
                &mut self.rng,
            );
            if let Some(constraint) = &self.constraint {
                for individual in &mut offspring {
                    constraint.apply_to(individual);
                }
            }

            let evaluations = evaluate_invalid(self.encoder, self.evaluator, &mut offspring)?;

            offspring.push(elitist);
            self.hall_of_fame.update(&offspring);
            population.replace(offspring);

            self.record(generation, evaluations, &mut gen_start, population, records);
            progress.update(generation);
        }

        progress.finish();
        Ok(())
    }

    fn check_constraint(&self, population: &Population) -> Result<(), EvolveError> {
        let (Some(constraint), Some(first)) =
            (&self.constraint, population.individuals().first())
        else {
            return Ok(());
        };
        let len = first.bits().len();
        if constraint.end() > len {
            return Err(EvolveError::ConstraintOutOfRange {
                start: constraint.start(),
                end: constraint.end(),
                len,
            });
        }
        Ok(())
    }

    fn record(
        &mut self,
        generation: usize,
        evaluations: usize,
        gen_start: &mut Instant,
        population: &Population,
        sink: &mut dyn RecordSink,
    ) {
        let record =
            GenerationRecord::compile(generation, evaluations, gen_start.elapsed(), population);
        *gen_start = Instant::now();
        sink.record(&record);
        self.logbook.append(record);
    }
}

/// Decodes and scores every individual whose fitness cache is invalid,
/// fanning out across scoped threads. Each task writes only its own
/// individual's fitness, so results rejoin in offspring order no matter
/// which worker finishes first. Returns the number of evaluations.
fn evaluate_invalid<E>(
    encoder: &GrayEncoder,
    evaluator: &E,
    individuals: &mut [Individual],
) -> Result<usize, EvolveError>
where
    E: OrganismEvaluator + ?Sized,
{
    let invalid: Vec<&mut Individual> = individuals
        .iter_mut()
        .filter(|individual| !individual.has_valid_fitness())
        .collect();
    let count = invalid.len();

    let mut outcomes: Vec<Result<(), EvolveError>> = Vec::with_capacity(count);
    outcomes.resize_with(count, || Ok(()));
    thread::scope(|scope| {
        for (individual, outcome) in iter::zip(invalid, &mut outcomes) {
            scope.spawn(move || *outcome = score_individual(encoder, evaluator, individual));
        }
    });
    for outcome in outcomes {
        outcome?;
    }
    Ok(count)
}

fn score_individual<E>(
    encoder: &GrayEncoder,
    evaluator: &E,
    individual: &mut Individual,
) -> Result<(), EvolveError>
where
    E: OrganismEvaluator + ?Sized,
{
    let weights = encoder.decode(individual.bits())?;
    let score = evaluator.evaluate(&weights)?;
    individual.set_fitness(score);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;

    /// Evaluator stub scoring through a fixed function of the decoded
    /// weight vector.
    #[derive(Debug)]
    struct StubEvaluator {
        features: usize,
        majors: usize,
        score: fn(&[u32]) -> u64,
        calls: AtomicUsize,
    }

    impl StubEvaluator {
        fn new(features: usize, majors: usize, score: fn(&[u32]) -> u64) -> Self {
            Self {
                features,
                majors,
                score,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    impl OrganismEvaluator for StubEvaluator {
        fn evaluate(&self, weights: &[u32]) -> Result<u64, EvaluationError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok((self.score)(weights))
        }

        fn num_features(&self) -> usize {
            self.features
        }

        fn num_major_features(&self) -> usize {
            self.majors
        }

        fn feature_labels(&self) -> Vec<String> {
            (0..self.features).map(|i| format!("f{i}")).collect()
        }
    }

    fn no_variation() -> GenerationParams {
        GenerationParams {
            crossover_prob: 0.0,
            swap_prob: 0.5,
            mutation_prob: 0.0,
        }
    }

    #[test]
    fn test_single_generation_without_variation() {
        let encoder = GrayEncoder::new(4).unwrap();
        let evaluator = StubEvaluator::new(1, 0, |weights| u64::from(weights[0]) % 7);
        let individuals = vec![
            Individual::from_bits(encoder.encode(3, 4)),
            Individual::from_bits(encoder.encode(5, 4)),
            Individual::from_bits(encoder.encode(6, 4)),
            Individual::from_bits(encoder.encode(1, 4)),
        ];
        let mut population = Population::from_individuals(individuals);
        let mut driver =
            EvolutionDriver::new(&evaluator, &encoder, no_variation(), Pcg64::seed_from_u64(42));

        driver
            .run(&mut population, 1, &mut NoProgress, &mut DiscardRecords)
            .unwrap();

        assert_eq!(population.len(), 4, "population size must be preserved");
        let max = population
            .individuals()
            .iter()
            .map(Individual::valid_fitness)
            .max()
            .unwrap();
        assert_eq!(max, 6, "the elitist keeps the pre-generation maximum");
        assert_eq!(driver.hall_of_fame().best().unwrap().valid_fitness(), 6);
        for individual in population.individuals() {
            assert!(
                [1, 3, 5, 6].contains(&individual.valid_fitness()),
                "without variation every survivor is a clone of an original"
            );
        }
    }

    #[test]
    fn test_fitness_cache_skips_unchanged_individuals() {
        let encoder = GrayEncoder::new(4).unwrap();
        let evaluator = StubEvaluator::new(1, 0, |weights| u64::from(weights[0]) + 1);
        let mut population = Population::random(&mut Pcg64::seed_from_u64(11), 6, 4);
        let mut driver =
            EvolutionDriver::new(&evaluator, &encoder, no_variation(), Pcg64::seed_from_u64(12));

        driver
            .run(&mut population, 3, &mut NoProgress, &mut DiscardRecords)
            .unwrap();

        assert_eq!(
            evaluator.calls(),
            6,
            "only generation 0 evaluates; clones are served from the cache"
        );
        let evaluations: Vec<usize> = driver
            .logbook()
            .records()
            .iter()
            .map(|r| r.evaluations)
            .collect();
        assert_eq!(evaluations, vec![6, 0, 0, 0]);
    }

    #[test]
    fn test_reevaluation_of_unchanged_individual_reproduces_cached_score() {
        let encoder = GrayEncoder::new(4).unwrap();
        let evaluator = StubEvaluator::new(1, 0, |weights| u64::from(weights[0]) + 1);
        let mut individual = Individual::random(&mut Pcg64::seed_from_u64(13), 4);

        score_individual(&encoder, &evaluator, &mut individual).unwrap();
        let cached = individual.valid_fitness();
        individual.invalidate_fitness();
        score_individual(&encoder, &evaluator, &mut individual).unwrap();
        assert_eq!(individual.valid_fitness(), cached);
    }

    #[test]
    fn test_population_size_and_record_count_over_many_generations() {
        let encoder = GrayEncoder::new(4).unwrap();
        let evaluator = StubEvaluator::new(2, 0, |weights| {
            u64::from(weights[0]) + u64::from(weights[1]) + 1
        });
        let mut population = Population::random(&mut Pcg64::seed_from_u64(21), 10, 8);
        let params = GenerationParams {
            crossover_prob: 0.75,
            swap_prob: 0.4,
            mutation_prob: 0.05,
        };
        let mut driver =
            EvolutionDriver::new(&evaluator, &encoder, params, Pcg64::seed_from_u64(22));

        driver
            .run(&mut population, 12, &mut NoProgress, &mut DiscardRecords)
            .unwrap();

        assert_eq!(population.len(), 10);
        assert_eq!(driver.logbook().records().len(), 13, "gen 0 plus 12");
        for (i, record) in driver.logbook().records().iter().enumerate() {
            assert_eq!(record.generation, i);
        }
    }

    #[test]
    fn test_elitism_never_regresses_max_fitness() {
        let encoder = GrayEncoder::new(4).unwrap();
        let evaluator = StubEvaluator::new(2, 0, |weights| {
            u64::from(weights[0]) + u64::from(weights[1]) + 1
        });
        let mut population = Population::random(&mut Pcg64::seed_from_u64(31), 8, 8);
        let params = GenerationParams {
            crossover_prob: 0.75,
            swap_prob: 0.4,
            mutation_prob: 0.1,
        };
        let mut driver =
            EvolutionDriver::new(&evaluator, &encoder, params, Pcg64::seed_from_u64(32));

        driver
            .run(&mut population, 20, &mut NoProgress, &mut DiscardRecords)
            .unwrap();

        let maxima: Vec<f64> = driver
            .logbook()
            .records()
            .iter()
            .map(|r| r.fitness.max)
            .collect();
        for pair in maxima.windows(2) {
            assert!(
                pair[1] >= pair[0],
                "max fitness regressed: {} then {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_all_zero_fitness_population_fails_selection() {
        let encoder = GrayEncoder::new(4).unwrap();
        let evaluator = StubEvaluator::new(1, 0, |_| 0);
        let mut population = Population::random(&mut Pcg64::seed_from_u64(41), 4, 4);
        let mut driver =
            EvolutionDriver::new(&evaluator, &encoder, no_variation(), Pcg64::seed_from_u64(42));

        let err = driver
            .run(&mut population, 1, &mut NoProgress, &mut DiscardRecords)
            .unwrap_err();
        assert_eq!(
            err,
            EvolveError::Selection(SelectionError::ZeroTotalFitness)
        );
    }

    #[test]
    fn test_pinned_gene_survives_generations() {
        // One 6-bit major segment pinned to 37, two 3-bit minor segments.
        let encoder = GrayEncoder::with_wide_prefix(3, 6, 6).unwrap();
        let evaluator = StubEvaluator::new(3, 1, |weights| u64::from(weights[1]) + 1);
        let constraint = GeneConstraint::new(0, encoder.encode(37, 6));
        let mut population = Population::random(&mut Pcg64::seed_from_u64(51), 8, 12);
        let params = GenerationParams {
            crossover_prob: 0.75,
            swap_prob: 0.4,
            mutation_prob: 0.1,
        };
        let mut driver = EvolutionDriver::new(&evaluator, &encoder, params, Pcg64::seed_from_u64(52))
            .with_constraint(constraint);

        driver
            .run(&mut population, 8, &mut NoProgress, &mut DiscardRecords)
            .unwrap();

        for individual in population.individuals() {
            let weights = encoder.decode(individual.bits()).unwrap();
            assert_eq!(weights[0], 37, "pinned major weight must never drift");
        }
        let best = driver.hall_of_fame().best().unwrap();
        assert_eq!(encoder.decode(best.bits()).unwrap()[0], 37);
    }

    #[test]
    fn test_constraint_out_of_range_is_rejected() {
        let encoder = GrayEncoder::new(4).unwrap();
        let evaluator = StubEvaluator::new(1, 0, |_| 1);
        let constraint = GeneConstraint::new(2, vec![true; 4]);
        let mut population = Population::random(&mut Pcg64::seed_from_u64(61), 2, 4);
        let mut driver = EvolutionDriver::new(
            &evaluator,
            &encoder,
            no_variation(),
            Pcg64::seed_from_u64(62),
        )
        .with_constraint(constraint);

        let err = driver
            .run(&mut population, 1, &mut NoProgress, &mut DiscardRecords)
            .unwrap_err();
        assert_eq!(
            err,
            EvolveError::ConstraintOutOfRange {
                start: 2,
                end: 6,
                len: 4
            }
        );
    }

    #[test]
    fn test_seeded_runs_reproduce_exactly() {
        fn final_fitness(seed: u64) -> Vec<u64> {
            let encoder = GrayEncoder::new(4).unwrap();
            let evaluator = StubEvaluator::new(2, 0, |weights| {
                u64::from(weights[0]) * 2 + u64::from(weights[1]) + 1
            });
            let mut population = Population::random(&mut Pcg64::seed_from_u64(seed), 6, 8);
            let params = GenerationParams {
                crossover_prob: 0.75,
                swap_prob: 0.4,
                mutation_prob: 0.05,
            };
            let mut driver =
                EvolutionDriver::new(&evaluator, &encoder, params, Pcg64::seed_from_u64(seed));
            driver
                .run(&mut population, 6, &mut NoProgress, &mut DiscardRecords)
                .unwrap();
            population
                .individuals()
                .iter()
                .map(Individual::valid_fitness)
                .collect()
        }

        assert_eq!(final_fitness(99), final_fitness(99));
    }
}
