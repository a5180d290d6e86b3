//! Per-generation statistics records.

use std::time::Duration;

use oxishogi_stats::descriptive::DescriptiveStats;

use crate::population::Population;

/// The write-once statistics record of one completed generation.
#[derive(Debug, Clone)]
pub struct GenerationRecord {
    /// Generation index; 0 is the freshly initialized population.
    pub generation: usize,
    /// Number of individuals evaluated this generation (the rest were
    /// served from the fitness cache).
    pub evaluations: usize,
    /// Wall time since the previous record.
    pub elapsed: Duration,
    /// Fitness distribution of the population after this generation.
    pub fitness: DescriptiveStats,
}

impl GenerationRecord {
    /// Compiles the record for a fully evaluated population.
    ///
    /// # Panics
    ///
    /// Panics if the population is empty or any fitness is invalid.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn compile(
        generation: usize,
        evaluations: usize,
        elapsed: Duration,
        population: &Population,
    ) -> Self {
        let fitness = DescriptiveStats::new(
            population
                .individuals()
                .iter()
                .map(|ind| ind.valid_fitness() as f64),
        )
        .expect("statistics require a non-empty population");
        Self {
            generation,
            evaluations,
            elapsed,
            fitness,
        }
    }
}

/// Append-only sequence of generation records for one run.
#[derive(Debug, Clone, Default)]
pub struct Logbook {
    records: Vec<GenerationRecord>,
}

impl Logbook {
    /// An empty logbook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the record of a completed generation.
    pub fn append(&mut self, record: GenerationRecord) {
        self.records.push(record);
    }

    /// All records in generation order.
    #[must_use]
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    /// The most recent record.
    #[must_use]
    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::Individual;

    #[test]
    fn test_compile_summarizes_population_fitness() {
        let individuals = [0_u64, 4, 16, 36]
            .iter()
            .map(|&fitness| {
                let mut ind = Individual::from_bits(vec![false; 4]);
                ind.set_fitness(fitness);
                ind
            })
            .collect();
        let population = Population::from_individuals(individuals);
        let record =
            GenerationRecord::compile(3, 2, Duration::from_millis(120), &population);
        assert_eq!(record.generation, 3);
        assert_eq!(record.evaluations, 2);
        assert_eq!(record.fitness.min, 0.0);
        assert_eq!(record.fitness.max, 36.0);
        assert_eq!(record.fitness.mean, 14.0);
    }
}
