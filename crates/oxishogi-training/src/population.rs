//! Individuals, populations and the hall of fame.

use rand::Rng;

/// A candidate solution: a bit chromosome plus its cached fitness.
///
/// The chromosome is owned exclusively by this individual; cloning an
/// individual deep-copies both the bits and the fitness state, so genetic
/// operators never alias chromosomes between individuals.
///
/// Fitness is either valid (`Some(score)` for the current chromosome) or
/// invalid (`None`: the chromosome changed since it was last scored and
/// must be re-evaluated before selection or statistics may read it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    bits: Vec<bool>,
    fitness: Option<u64>,
}

impl Individual {
    /// Creates an individual with a uniformly random chromosome and invalid
    /// fitness.
    pub fn random<R>(rng: &mut R, chromosome_len: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let bits = (0..chromosome_len).map(|_| rng.random()).collect();
        Self { bits, fitness: None }
    }

    /// Wraps an explicit chromosome; fitness starts invalid.
    #[must_use]
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits, fitness: None }
    }

    /// The chromosome bits.
    #[must_use]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Mutable chromosome access for operators and constraints. Callers
    /// must invalidate fitness themselves when they change any bit.
    pub(crate) fn bits_mut(&mut self) -> &mut [bool] {
        &mut self.bits
    }

    /// The cached fitness, or `None` while invalid.
    #[must_use]
    pub fn fitness(&self) -> Option<u64> {
        self.fitness
    }

    /// Whether the cached fitness is valid for the current chromosome.
    #[must_use]
    pub fn has_valid_fitness(&self) -> bool {
        self.fitness.is_some()
    }

    /// Stores the score of the current chromosome.
    pub fn set_fitness(&mut self, score: u64) {
        self.fitness = Some(score);
    }

    /// Marks the cached fitness stale after a chromosome change.
    pub fn invalidate_fitness(&mut self) {
        self.fitness = None;
    }

    /// The cached fitness of an evaluated individual.
    ///
    /// # Panics
    ///
    /// Panics if the fitness is invalid; callers use this only after the
    /// evaluation step of the current generation.
    #[must_use]
    pub fn valid_fitness(&self) -> u64 {
        self.fitness
            .expect("fitness must be evaluated before it is read")
    }
}

/// An ordered, fixed-size collection of individuals.
///
/// The size is exactly the configured population size after every completed
/// generation; it shrinks only transiently while the next generation's
/// offspring are being assembled.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Builds a population of `count` random individuals.
    pub fn random<R>(rng: &mut R, count: usize, chromosome_len: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::random(rng, chromosome_len))
            .collect();
        Self { individuals }
    }

    /// Wraps an explicit individual list.
    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    /// Number of individuals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// All individuals, in population order.
    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub(crate) fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// The best individual by fitness; on ties, the first in population
    /// order (deterministic for a fixed seed and ordering).
    ///
    /// # Panics
    ///
    /// Panics if the population is empty or any fitness is invalid.
    #[must_use]
    pub fn best(&self) -> &Individual {
        assert!(!self.individuals.is_empty(), "population must not be empty");
        let mut best = &self.individuals[0];
        for individual in &self.individuals[1..] {
            if individual.valid_fitness() > best.valid_fitness() {
                best = individual;
            }
        }
        best
    }

    /// Replaces the whole population with the next generation.
    pub fn replace(&mut self, next: Vec<Individual>) {
        self.individuals = next;
    }
}

/// Retains the single best individual ever observed across a run.
///
/// Updated every generation; survives population turnover; never shrinks.
/// On fitness ties the earlier inductee is kept.
#[derive(Debug, Clone, Default)]
pub struct HallOfFame {
    best: Option<Individual>,
}

impl HallOfFame {
    /// An empty hall of fame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Considers every individual of a generation for induction.
    ///
    /// # Panics
    ///
    /// Panics if any candidate's fitness is invalid.
    pub fn update(&mut self, individuals: &[Individual]) {
        for individual in individuals {
            let fitness = individual.valid_fitness();
            let replace = match &self.best {
                None => true,
                Some(best) => fitness > best.valid_fitness(),
            };
            if replace {
                self.best = Some(individual.clone());
            }
        }
    }

    /// The best individual seen so far, if any generation was recorded.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;

    fn scored(bits: Vec<bool>, fitness: u64) -> Individual {
        let mut ind = Individual::from_bits(bits);
        ind.set_fitness(fitness);
        ind
    }

    #[test]
    fn test_random_individual_has_invalid_fitness() {
        let mut rng = Pcg64::seed_from_u64(1);
        let ind = Individual::random(&mut rng, 24);
        assert_eq!(ind.bits().len(), 24);
        assert!(!ind.has_valid_fitness());
    }

    #[test]
    fn test_clone_does_not_share_chromosome() {
        let mut original = scored(vec![true, false, true], 9);
        let copy = original.clone();
        original.bits_mut()[0] = false;
        original.invalidate_fitness();
        assert_eq!(copy.bits(), &[true, false, true]);
        assert_eq!(copy.fitness(), Some(9));
    }

    #[test]
    fn test_best_breaks_ties_toward_first() {
        let population = Population::from_individuals(vec![
            scored(vec![false], 3),
            scored(vec![true], 7),
            scored(vec![false, false], 7),
        ]);
        assert_eq!(population.best().bits(), &[true]);
    }

    #[test]
    fn test_hall_of_fame_keeps_first_on_ties() {
        let mut hof = HallOfFame::new();
        hof.update(&[scored(vec![true], 5)]);
        hof.update(&[scored(vec![false], 5)]);
        assert_eq!(hof.best().unwrap().bits(), &[true]);

        hof.update(&[scored(vec![false, true], 6)]);
        assert_eq!(hof.best().unwrap().valid_fitness(), 6);
    }

    #[test]
    fn test_hall_of_fame_survives_worse_generations() {
        let mut hof = HallOfFame::new();
        hof.update(&[scored(vec![true], 10)]);
        hof.update(&[scored(vec![false], 2), scored(vec![false], 1)]);
        assert_eq!(hof.best().unwrap().valid_fitness(), 10);
    }
}
