use std::{iter, path::PathBuf, time::Instant};

use anyhow::Context;
use chrono::Utc;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use oxishogi_encoding::GrayEncoder;
use oxishogi_evaluator::{FeatureClass, OrganismEvaluator, ReferenceMatchEvaluator};
use oxishogi_training::{EvolutionDriver, GeneConstraint, GenerationParams, Population};

use crate::{
    progress::StderrProgress,
    run_log::RunLog,
    schema::trained_model::{TrainedModel, TrainedWeight},
    util::{self, Output},
};

const POP_SIZE: usize = 100;
const N_GEN: usize = 200;
const CROSSOVER_PROB: f64 = 0.75;
const SWAP_PROB: f64 = 0.4;
const MUTATION_PROB: f64 = 0.005;

const BIT_WIDTH_SMALL: usize = 7;
const BIT_WIDTH_WIDE: usize = 12;

/// Weight pinned onto the first major segment so every other weight is
/// measured against a fixed material scale.
const ANCHOR_WEIGHT: u32 = 100;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Evaluation set JSON (feature schema + training positions)
    #[arg(long)]
    eval_set: PathBuf,
    /// Individuals per generation
    #[arg(long, default_value_t = POP_SIZE)]
    pop_size: usize,
    /// Number of generations
    #[arg(long, default_value_t = N_GEN)]
    generations: usize,
    /// Probability of crossing over each adjacent offspring pair
    #[arg(long, default_value_t = CROSSOVER_PROB)]
    crossover_prob: f64,
    /// Per-bit swap probability within an applied crossover
    #[arg(long, default_value_t = SWAP_PROB)]
    swap_prob: f64,
    /// Per-bit mutation probability
    #[arg(long, default_value_t = MUTATION_PROB)]
    mutation_prob: f64,
    /// Chromosome bits per minor feature weight
    #[arg(long, default_value_t = BIT_WIDTH_SMALL)]
    bit_width_small: usize,
    /// Chromosome bits per major feature weight
    #[arg(long, default_value_t = BIT_WIDTH_WIDE)]
    bit_width_wide: usize,
    /// Pin the first major weight to this value as the scale anchor
    #[arg(long, default_value_t = ANCHOR_WEIGHT)]
    anchor_weight: u32,
    /// Disable the anchor-weight constraint
    #[arg(long)]
    no_anchor: bool,
    /// Evaluate only the first N positions of the set
    #[arg(long)]
    limit: Option<usize>,
    /// Seed for the run RNG; drawn from entropy when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Run log file
    #[arg(long, default_value = "results.txt")]
    log_file: PathBuf,
    /// Trained model JSON path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    anyhow::ensure!(arg.pop_size >= 2, "--pop-size must be at least 2");
    anyhow::ensure!(arg.generations >= 1, "--generations must be at least 1");

    let set = util::read_eval_set(&arg.eval_set)?;
    let mut evaluator = ReferenceMatchEvaluator::new(set);
    if let Some(limit) = arg.limit {
        evaluator
            .set_position_limit(limit)
            .context("invalid --limit")?;
    }

    let num_major = evaluator.num_major_features();
    let num_minor = evaluator.num_features() - num_major;
    let encoder = GrayEncoder::with_wide_prefix(
        arg.bit_width_small,
        arg.bit_width_wide,
        num_major * arg.bit_width_wide,
    )
    .context("unsupported chromosome layout for this evaluation set")?;
    let chromosome_len = encoder.chromosome_len(num_major, num_minor);

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut population = Population::random(&mut rng, arg.pop_size, chromosome_len);

    let params = GenerationParams {
        crossover_prob: arg.crossover_prob,
        swap_prob: arg.swap_prob,
        mutation_prob: arg.mutation_prob,
    };
    let mut driver = EvolutionDriver::new(&evaluator, &encoder, params, rng);
    if !arg.no_anchor && num_major > 0 {
        anyhow::ensure!(
            u64::from(arg.anchor_weight) < 1 << arg.bit_width_wide,
            "--anchor-weight {} does not fit in {} bits",
            arg.anchor_weight,
            arg.bit_width_wide
        );
        let pinned = encoder.encode(arg.anchor_weight, arg.bit_width_wide);
        driver = driver.with_constraint(GeneConstraint::new(0, pinned));
    }

    let mut log = RunLog::create(&arg.log_file)?;
    log_params(&mut log, arg, &evaluator, chromosome_len, seed)?;
    log.generation_header()?;

    eprintln!("--------------- Beginning Evolution ---------------");
    let mut progress = StderrProgress::new(arg.generations);
    let run_start = Instant::now();
    driver
        .run(&mut population, arg.generations, &mut progress, &mut log)
        .context("evolution run failed")?;
    let elapsed = run_start.elapsed();

    let best = driver
        .hall_of_fame()
        .best()
        .context("hall of fame is empty after the run")?
        .clone();
    let best_weights = encoder.decode(best.bits())?;
    let labels = evaluator.feature_labels();

    log.line("")?;
    log.line(&format!("Evolution took {}", util::format_hms(elapsed)))?;
    log.line("")?;
    log.line("--------------- Best Individual ---------------")?;
    for (label, weight) in iter::zip(&labels, &best_weights) {
        log.line(&format!("{label}: {weight}"))?;
    }
    log.line("")?;
    log.line("--------------- Final Population ---------------")?;
    for individual in population.individuals() {
        let weights = encoder.decode(individual.bits())?;
        let row = weights
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        log.line(&row)?;
    }
    log.finish()?;

    let classes: Vec<FeatureClass> = evaluator
        .evaluation_set()
        .schema
        .features()
        .iter()
        .map(|f| f.class)
        .collect();
    let model = TrainedModel {
        trained_at: Utc::now(),
        seed,
        generations: arg.generations,
        fitness: best.valid_fitness(),
        duration_secs: elapsed.as_secs(),
        weights: iter::zip(iter::zip(labels, classes), best_weights)
            .map(|((label, class), weight)| TrainedWeight {
                label,
                class,
                weight,
            })
            .collect(),
    };
    Output::save_json(&model, arg.output.clone())?;

    eprintln!(
        "Finished evolution, see {} for the full log.",
        arg.log_file.display()
    );
    eprintln!("  Duration: {}", util::format_hms(elapsed));
    eprintln!("  Best fitness: {}", model.fitness);
    if let Some(path) = &arg.output {
        eprintln!("  Model: {}", path.display());
    }
    Ok(())
}

fn log_params(
    log: &mut RunLog,
    arg: &TrainArg,
    evaluator: &ReferenceMatchEvaluator,
    chromosome_len: usize,
    seed: u64,
) -> anyhow::Result<()> {
    let num_major = evaluator.num_major_features();
    let num_minor = evaluator.num_features() - num_major;

    log.line("---------- Evaluation Set ----------")?;
    log.line(&format!("Major features: {num_major}"))?;
    log.line(&format!("Minor features: {num_minor}"))?;
    log.line(&format!("Total features: {}", evaluator.num_features()))?;
    log.line(&format!(
        "Positions evaluated: {}",
        evaluator.position_limit()
    ))?;
    log.line("")?;

    log.line("---------- GA Parameters ----------")?;
    log.line(&format!("Population size = {}", arg.pop_size))?;
    log.line(&format!("Crossover probability = {}", arg.crossover_prob))?;
    log.line(&format!("Crossover swap probability = {}", arg.swap_prob))?;
    log.line(&format!("Mutation probability = {}", arg.mutation_prob))?;
    log.line(&format!("Generations = {}", arg.generations))?;
    log.line(&format!("Bit width small (minor) = {}", arg.bit_width_small))?;
    log.line(&format!("Bit width wide (major) = {}", arg.bit_width_wide))?;
    log.line(&format!("Chromosome length = {chromosome_len}"))?;
    log.line(&format!("Seed = {seed}"))?;
    if arg.no_anchor || num_major == 0 {
        log.line("Anchor weight = disabled")?;
    } else {
        log.line(&format!("Anchor weight = {}", arg.anchor_weight))?;
    }
    log.line("")?;

    log.line("---------- Features ----------")?;
    for feature in evaluator.evaluation_set().schema.features() {
        let class = match feature.class {
            FeatureClass::Major => "Major",
            FeatureClass::Minor => "Minor",
        };
        log.line(&format!("{}: {class}", feature.label))?;
    }
    log.line("")?;

    log.line("---------- GA Results ----------")?;
    Ok(())
}
