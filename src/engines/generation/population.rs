use crate::config::EvolutionConfig;
use crate::engines::evaluation::physics::ActuationSink;
use crate::engines::generation::{
    genome::{Chromosome, LIMB_COUNT},
    individual::Individual,
    operators::{mutate_one_per_limb, select_parent, uniform_crossover, MutationSite},
};
use crate::error::{Result, StridegenError};
use crate::types::IndividualId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parent draw resolved to an individual
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracedSelection {
    pub id: IndividualId,
    pub attempts: usize,
    pub fell_back: bool,
}

/// Provenance of one slot of the new generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offspring {
    pub id: IndividualId,
    pub parents: (IndividualId, IndividualId),
    /// Empty unless the mutation draw succeeded for this slot
    pub mutations: Vec<MutationSite>,
}

/// Summary of one completed generation advance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Index of the generation that was just evaluated
    pub generation: u64,
    pub average_fitness: f64,
    pub best: Option<(IndividualId, f64)>,
    pub fallback_selections: usize,
    pub offspring: Vec<Offspring>,
}

impl GenerationOutcome {
    pub fn mutated_count(&self) -> usize {
        self.offspring.iter().filter(|o| !o.mutations.is_empty()).count()
    }
}

pub struct Population {
    individuals: Vec<Individual>,
    fitness: HashMap<IndividualId, f64>,
    /// Set by `freeze_fitness`, cleared by any later intake
    average_fitness: Option<f64>,
    /// Scores in population order, filled alongside `average_fitness`
    frozen_scores: Vec<f64>,
    generation: u64,
    mutation_rate: f64,
    dimensions: (usize, usize),
    rng: StdRng,
}

impl Population {
    /// Random initial population, `LIMB_COUNT` limbs per walker.
    pub fn new(config: &EvolutionConfig) -> Result<Self> {
        Self::with_limbs(config, LIMB_COUNT)
    }

    pub fn with_limbs(config: &EvolutionConfig, limbs: usize) -> Result<Self> {
        if config.population_size == 0 || config.chromosome_length == 0 || limbs == 0 {
            return Err(StridegenError::Configuration(
                "Population size, chromosome length and limb count must be positive".to_string(),
            ));
        }
        let mut rng = Self::make_rng(config.seed);
        let chromosomes = (0..config.population_size)
            .map(|_| Chromosome::random(limbs, config.chromosome_length, &mut rng))
            .collect();

        Self::assemble(chromosomes, config.mutation_rate, rng)
    }

    /// Population seeded with known chromosomes, all of one shape.
    pub fn from_chromosomes(
        chromosomes: Vec<Chromosome>,
        mutation_rate: f64,
        seed: Option<u64>,
    ) -> Result<Self> {
        Self::assemble(chromosomes, mutation_rate, Self::make_rng(seed))
    }

    fn assemble(chromosomes: Vec<Chromosome>, mutation_rate: f64, rng: StdRng) -> Result<Self> {
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(StridegenError::Configuration(
                "Mutation rate must be between 0 and 1".to_string(),
            ));
        }
        let dimensions = chromosomes
            .first()
            .map(Chromosome::dimensions)
            .ok_or_else(|| StridegenError::Configuration("Population must not be empty".to_string()))?;
        if dimensions.0 == 0 || dimensions.1 == 0 {
            return Err(StridegenError::DimensionMismatch {
                expected: (dimensions.0.max(1), dimensions.1.max(1)),
                actual: dimensions,
            });
        }
        for chromosome in &chromosomes {
            chromosome.ensure_dimensions(dimensions)?;
        }

        let individuals = chromosomes
            .into_iter()
            .enumerate()
            .map(|(i, chromosome)| Individual::new(IndividualId(i), chromosome))
            .collect();

        Ok(Self {
            individuals,
            fitness: HashMap::new(),
            average_fitness: None,
            frozen_scores: Vec::new(),
            generation: 0,
            mutation_rate,
            dimensions,
            rng,
        })
    }

    fn make_rng(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// `(limbs, chromosome_length)` shared by every individual
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub(crate) fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    pub fn ids(&self) -> impl Iterator<Item = IndividualId> + '_ {
        self.individuals.iter().map(Individual::id)
    }

    pub fn individual(&self, id: IndividualId) -> Result<&Individual> {
        self.individuals
            .get(id.index())
            .ok_or(StridegenError::UnknownIndividual(id))
    }

    /// Individuals still consuming their chromosome
    pub fn pending(&self) -> usize {
        self.individuals.iter().filter(|i| !i.is_complete()).count()
    }

    pub fn all_complete(&self) -> bool {
        self.individuals.iter().all(Individual::is_complete)
    }

    /// Store a score for this generation. A second call for the same id overwrites.
    pub fn record_fitness(&mut self, id: IndividualId, score: f64) -> Result<()> {
        if id.index() >= self.individuals.len() {
            return Err(StridegenError::UnknownIndividual(id));
        }
        self.fitness.insert(id, score);
        self.average_fitness = None;
        self.frozen_scores.clear();
        Ok(())
    }

    pub fn fitness(&self, id: IndividualId) -> Option<f64> {
        self.fitness.get(&id).copied()
    }

    /// Mean of the frozen table, `None` until `freeze_fitness` succeeds.
    pub fn average_fitness(&self) -> Option<f64> {
        self.average_fitness
    }

    /// Close intake for this generation and compute the mean.
    pub fn freeze_fitness(&mut self) -> Result<f64> {
        if self.fitness.len() != self.individuals.len() {
            return Err(StridegenError::EmptyPopulationFitness {
                recorded: self.fitness.len(),
                expected: self.individuals.len(),
            });
        }
        // Population order, not hash order
        self.frozen_scores = self.fitness_vector()?;
        let average = self.frozen_scores.iter().sum::<f64>() / self.individuals.len() as f64;
        self.average_fitness = Some(average);
        Ok(average)
    }

    /// Population-ordered scores of the frozen table, `None` until frozen.
    pub fn frozen_scores(&self) -> Option<&[f64]> {
        self.average_fitness.map(|_| self.frozen_scores.as_slice())
    }

    pub fn select_parent(&mut self) -> Result<IndividualId> {
        self.select_parent_traced().map(|pick| pick.id)
    }

    pub fn select_parent_traced(&mut self) -> Result<TracedSelection> {
        let average = self.average_fitness.ok_or(StridegenError::EmptyPopulationFitness {
            recorded: self.fitness.len(),
            expected: self.individuals.len(),
        })?;
        let pick = select_parent(&self.frozen_scores, average, &mut self.rng).ok_or(
            StridegenError::EmptyPopulationFitness { recorded: 0, expected: 0 },
        )?;
        if pick.fell_back {
            log::debug!(
                "Selection budget exhausted after {} draws, keeping {}",
                pick.attempts,
                IndividualId(pick.index)
            );
        }

        Ok(TracedSelection {
            id: IndividualId(pick.index),
            attempts: pick.attempts,
            fell_back: pick.fell_back,
        })
    }

    pub fn crossover(&mut self, parent_a: IndividualId, parent_b: IndividualId) -> Result<Chromosome> {
        let lookup = |id: IndividualId| {
            self.individuals
                .get(id.index())
                .map(Individual::chromosome)
                .ok_or(StridegenError::UnknownIndividual(id))
        };
        let a = lookup(parent_a)?;
        let b = lookup(parent_b)?;
        uniform_crossover(a, b, &mut self.rng)
    }

    /// One forced mutation per limb, on a chromosome shaped like this population's.
    pub fn mutate(&mut self, chromosome: &mut Chromosome) -> Result<Vec<MutationSite>> {
        chromosome.ensure_dimensions(self.dimensions)?;
        mutate_one_per_limb(chromosome, &mut self.rng)
    }

    /// Replace every chromosome with the offspring of the scored generation.
    ///
    /// Requires the completion barrier and a full fitness table. Each individual is
    /// reset in `sink` and in its own state before its new chromosome goes in;
    /// mutation then acts on the installed chromosome.
    pub fn advance_generation<S: ActuationSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<GenerationOutcome> {
        let pending = self.pending();
        if pending > 0 {
            return Err(StridegenError::BarrierNotReached { pending });
        }

        let average_fitness = match self.average_fitness {
            Some(average) => average,
            None => self.freeze_fitness()?,
        };
        let best = self
            .fitness
            .iter()
            .map(|(id, score)| (*id, *score))
            .max_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.0.cmp(&a.0))
            });

        let mut fallback_selections = 0;
        let mut lineage = Vec::with_capacity(self.individuals.len());
        let mut next_generation = Vec::with_capacity(self.individuals.len());
        for _ in 0..self.individuals.len() {
            let first = self.select_parent_traced()?;
            let second = self.select_parent_traced()?;
            fallback_selections += usize::from(first.fell_back) + usize::from(second.fell_back);

            next_generation.push(self.crossover(first.id, second.id)?);
            lineage.push((first.id, second.id));
        }

        for (individual, chromosome) in self.individuals.iter_mut().zip(next_generation) {
            sink.reset_individual(individual.id());
            individual.reset();
            individual.install(chromosome);
        }

        let mut offspring = Vec::with_capacity(self.individuals.len());
        for (index, parents) in lineage.into_iter().enumerate() {
            let mut mutations = Vec::new();
            if self.rng.gen::<f64>() <= self.mutation_rate {
                let chromosome = self.individuals[index].chromosome_mut();
                mutations = mutate_one_per_limb(chromosome, &mut self.rng)?;
            }
            offspring.push(Offspring {
                id: IndividualId(index),
                parents,
                mutations,
            });
        }

        let outcome = GenerationOutcome {
            generation: self.generation,
            average_fitness,
            best,
            fallback_selections,
            offspring,
        };

        self.fitness.clear();
        self.average_fitness = None;
        self.frozen_scores.clear();
        self.generation += 1;

        log::info!(
            "Generation {} bred: average fitness {:.3}, {} mutated, {} fallback selections",
            outcome.generation,
            outcome.average_fitness,
            outcome.mutated_count(),
            outcome.fallback_selections
        );

        Ok(outcome)
    }

    fn fitness_vector(&self) -> Result<Vec<f64>> {
        self.individuals
            .iter()
            .map(|individual| {
                self.fitness(individual.id()).ok_or(StridegenError::EmptyPopulationFitness {
                    recorded: self.fitness.len(),
                    expected: self.individuals.len(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActuationCommand;

    #[derive(Default)]
    struct ResetLog {
        resets: Vec<IndividualId>,
    }

    impl ActuationSink for ResetLog {
        fn apply(&mut self, _command: &ActuationCommand) {}

        fn reset_individual(&mut self, id: IndividualId) {
            self.resets.push(id);
        }
    }

    fn config(size: usize, length: usize, rate: f64) -> EvolutionConfig {
        EvolutionConfig {
            population_size: size,
            chromosome_length: length,
            mutation_rate: rate,
            seed: Some(42),
            ..EvolutionConfig::default()
        }
    }

    fn run_to_barrier(population: &mut Population) {
        for individual in population.individuals_mut() {
            while !individual.is_complete() {
                individual.advance();
            }
        }
    }

    fn score_by_index(population: &mut Population) {
        let ids: Vec<_> = population.ids().collect();
        for id in ids {
            population.record_fitness(id, id.index() as f64).unwrap();
        }
    }

    #[test]
    fn test_new_population_shape() {
        let population = Population::new(&config(6, 9, 0.1)).unwrap();
        assert_eq!(population.len(), 6);
        assert_eq!(population.dimensions(), (LIMB_COUNT, 9));
        assert_eq!(population.generation(), 0);
        assert_eq!(population.pending(), 6);
        for (i, individual) in population.individuals().iter().enumerate() {
            assert_eq!(individual.id(), IndividualId(i));
        }
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(Population::new(&config(0, 9, 0.1)).is_err());
        assert!(Population::new(&config(4, 0, 0.1)).is_err());
        assert!(Population::new(&config(4, 9, 1.5)).is_err());
    }

    #[test]
    fn test_same_seed_same_population() {
        let a = Population::new(&config(5, 12, 0.1)).unwrap();
        let b = Population::new(&config(5, 12, 0.1)).unwrap();
        for (x, y) in a.individuals().iter().zip(b.individuals()) {
            assert_eq!(x.chromosome(), y.chromosome());
        }
    }

    #[test]
    fn test_fitness_intake_last_write_wins() {
        let mut population = Population::new(&config(3, 4, 0.0)).unwrap();
        population.record_fitness(IndividualId(0), 1.0).unwrap();
        population.record_fitness(IndividualId(1), 2.0).unwrap();

        assert!(matches!(
            population.freeze_fitness(),
            Err(StridegenError::EmptyPopulationFitness { recorded: 2, expected: 3 })
        ));

        population.record_fitness(IndividualId(2), 3.0).unwrap();
        population.record_fitness(IndividualId(0), 4.0).unwrap();
        assert_eq!(population.fitness(IndividualId(0)), Some(4.0));
        assert_eq!(population.freeze_fitness().unwrap(), 3.0);

        assert!(matches!(
            population.record_fitness(IndividualId(3), 1.0),
            Err(StridegenError::UnknownIndividual(IndividualId(3)))
        ));
    }

    #[test]
    fn test_selection_requires_frozen_table() {
        let mut population = Population::new(&config(4, 4, 0.0)).unwrap();
        assert!(matches!(
            population.select_parent(),
            Err(StridegenError::EmptyPopulationFitness { .. })
        ));

        score_by_index(&mut population);
        assert!(population.select_parent().is_err());

        population.freeze_fitness().unwrap();
        assert!(population.select_parent().is_ok());

        // New intake reopens the table
        population.record_fitness(IndividualId(0), 10.0).unwrap();
        assert!(population.select_parent().is_err());
    }

    #[test]
    fn test_selection_attempts_bounded() {
        let mut population = Population::new(&config(9, 4, 0.0)).unwrap();
        score_by_index(&mut population);
        population.freeze_fitness().unwrap();

        for _ in 0..300 {
            let pick = population.select_parent_traced().unwrap();
            assert!(pick.attempts <= 9 / 2 + 1);
            if !pick.fell_back {
                assert!(pick.id.index() >= 4, "below-average pick {}", pick.id);
            }
        }
    }

    #[test]
    fn test_mutate_rejects_foreign_shape() {
        let mut population = Population::new(&config(2, 4, 0.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut other = Chromosome::random(LIMB_COUNT, 5, &mut rng);
        assert!(matches!(
            population.mutate(&mut other),
            Err(StridegenError::DimensionMismatch { .. })
        ));

        let mut same = Chromosome::random(LIMB_COUNT, 4, &mut rng);
        assert_eq!(population.mutate(&mut same).unwrap().len(), LIMB_COUNT);
    }

    #[test]
    fn test_advance_requires_barrier() {
        let mut population = Population::new(&config(3, 2, 0.0)).unwrap();
        let mut sink = ResetLog::default();
        assert!(matches!(
            population.advance_generation(&mut sink),
            Err(StridegenError::BarrierNotReached { pending: 3 })
        ));
        assert!(sink.resets.is_empty());
    }

    #[test]
    fn test_advance_requires_fitness() {
        let mut population = Population::new(&config(3, 2, 0.0)).unwrap();
        run_to_barrier(&mut population);
        let mut sink = ResetLog::default();
        assert!(matches!(
            population.advance_generation(&mut sink),
            Err(StridegenError::EmptyPopulationFitness { recorded: 0, expected: 3 })
        ));
        assert_eq!(population.generation(), 0);
    }

    #[test]
    fn test_advance_generation_resets_and_counts() {
        let mut population = Population::new(&config(5, 3, 0.5)).unwrap();
        run_to_barrier(&mut population);
        score_by_index(&mut population);

        let mut sink = ResetLog::default();
        let outcome = population.advance_generation(&mut sink).unwrap();

        assert_eq!(outcome.generation, 0);
        assert_eq!(outcome.average_fitness, 2.0);
        assert_eq!(outcome.best, Some((IndividualId(4), 4.0)));
        assert_eq!(outcome.offspring.len(), 5);
        assert_eq!(population.generation(), 1);
        assert_eq!(population.len(), 5);
        assert_eq!(sink.resets, (0..5).map(IndividualId).collect::<Vec<_>>());
        assert_eq!(population.pending(), 5);
        assert!(population.individuals().iter().all(|i| i.cursor() == 0));
        assert_eq!(population.fitness(IndividualId(0)), None);
        assert_eq!(population.average_fitness(), None);
    }

    #[test]
    fn test_frozen_scores_follow_population_order() {
        let mut population = Population::new(&config(4, 2, 0.0)).unwrap();
        assert_eq!(population.frozen_scores(), None);

        for index in (0..4).rev() {
            population.record_fitness(IndividualId(index), index as f64 * 10.0).unwrap();
        }
        population.freeze_fitness().unwrap();
        assert_eq!(population.frozen_scores(), Some(&[0.0, 10.0, 20.0, 30.0][..]));

        population.record_fitness(IndividualId(0), 50.0).unwrap();
        assert_eq!(population.frozen_scores(), None);
        assert!(population.select_parent().is_err());

        population.freeze_fitness().unwrap();
        assert_eq!(population.frozen_scores(), Some(&[50.0, 10.0, 20.0, 30.0][..]));
        assert_eq!(population.average_fitness(), Some(27.5));

        run_to_barrier(&mut population);
        population.advance_generation(&mut ResetLog::default()).unwrap();
        assert_eq!(population.frozen_scores(), None);
    }
}
