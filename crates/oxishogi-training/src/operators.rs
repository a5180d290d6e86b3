//! Genetic operators over bit chromosomes.
//!
//! All operators take the random source as `R: Rng + ?Sized` so the run's
//! single seeded generator threads through every stochastic decision —
//! reproducibility comes from the seed, not from operator-local state.
//!
//! Crossover and mutation work in place on cloned survivors and invalidate
//! an individual's cached fitness only when its chromosome actually changed
//! (swapping two equal bits is not a change). Selection is
//! fitness-proportionate roulette and fails explicitly on an all-zero
//! population instead of dividing by zero.

use derive_more as dm;
use rand::Rng;

use crate::population::Individual;

/// Roulette selection is undefined for the given population.
#[derive(Debug, Clone, PartialEq, Eq, dm::Display, dm::Error)]
pub enum SelectionError {
    /// Every individual scored zero, so selection probabilities degenerate.
    #[display("roulette selection undefined: total population fitness is zero")]
    ZeroTotalFitness,
}

/// Fitness-proportionate ("roulette") selection of `count` individuals.
///
/// Each pick spins once over the cumulative fitness of the population in
/// population order; an individual's chance is its fitness over the
/// population total. Picks are independent, so strong individuals are
/// typically selected several times. The chosen individuals are deep
/// clones.
///
/// # Errors
///
/// Returns [`SelectionError::ZeroTotalFitness`] when the population's total
/// fitness is zero.
///
/// # Panics
///
/// Panics if the population is empty or any fitness is invalid.
pub fn select_roulette<R>(
    individuals: &[Individual],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Individual>, SelectionError>
where
    R: Rng + ?Sized,
{
    assert!(!individuals.is_empty(), "population must not be empty");
    let total: u64 = individuals.iter().map(Individual::valid_fitness).sum();
    if total == 0 {
        return Err(SelectionError::ZeroTotalFitness);
    }

    #[expect(clippy::cast_precision_loss)]
    let total = total as f64;
    let mut chosen = Vec::with_capacity(count);
    for _ in 0..count {
        let spin = rng.random_range(0.0..total);
        let mut pick = individuals.len() - 1;
        let mut acc = 0.0;
        for (i, individual) in individuals.iter().enumerate() {
            #[expect(clippy::cast_precision_loss)]
            {
                acc += individual.valid_fitness() as f64;
            }
            if acc > spin {
                pick = i;
                break;
            }
        }
        chosen.push(individuals[pick].clone());
    }
    Ok(chosen)
}

/// Uniform crossover between two individuals, in place.
///
/// Each bit position swaps independently with probability `swap_prob`.
/// Fitness is invalidated for a parent only if its chromosome differs
/// afterwards, which requires at least one swapped position where the
/// parents disagreed.
///
/// # Panics
///
/// Panics if the chromosomes have different lengths.
pub fn crossover_uniform<R>(a: &mut Individual, b: &mut Individual, swap_prob: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    assert_eq!(
        a.bits().len(),
        b.bits().len(),
        "crossover requires equal-length chromosomes"
    );
    let mut changed = false;
    let (a_bits, b_bits) = (a.bits_mut(), b.bits_mut());
    for (a_bit, b_bit) in a_bits.iter_mut().zip(b_bits.iter_mut()) {
        if rng.random_bool(swap_prob) {
            if a_bit != b_bit {
                changed = true;
            }
            std::mem::swap(a_bit, b_bit);
        }
    }
    if changed {
        a.invalidate_fitness();
        b.invalidate_fitness();
    }
}

/// Flip-bit mutation, in place.
///
/// Every bit flips independently with probability `flip_prob`. Fitness is
/// invalidated only when at least one bit flipped.
pub fn mutate_flip_bits<R>(individual: &mut Individual, flip_prob: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let mut changed = false;
    for bit in individual.bits_mut() {
        if rng.random_bool(flip_prob) {
            *bit = !*bit;
            changed = true;
        }
    }
    if changed {
        individual.invalidate_fitness();
    }
}

/// Applies crossover then mutation across an offspring list.
///
/// Crossover hits adjacent non-overlapping pairs (0↔1, 2↔3, …), each pair
/// with probability `crossover_prob`; an unpaired final individual is left
/// alone. Mutation then visits every individual independently. The two
/// operators are deliberately not mutually exclusive — an individual may
/// undergo both in the same generation.
pub fn vary<R>(
    offspring: &mut [Individual],
    crossover_prob: f64,
    swap_prob: f64,
    mutation_prob: f64,
    rng: &mut R,
) where
    R: Rng + ?Sized,
{
    for pair in offspring.chunks_exact_mut(2) {
        if rng.random_bool(crossover_prob) {
            let (first, second) = pair.split_at_mut(1);
            crossover_uniform(&mut first[0], &mut second[0], swap_prob, rng);
        }
    }
    for individual in offspring.iter_mut() {
        mutate_flip_bits(individual, mutation_prob, rng);
    }
}
