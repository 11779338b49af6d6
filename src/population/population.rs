//! Generational population
//!
//! [`Population`] owns a bounded, deduplicated set of programs and advances it
//! one generation per [`Population::step`]. Each generation is assembled in
//! full before it replaces the previous one, so an error part-way through a
//! step leaves the population as it was.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace, warn};
use rand::{Rng, RngCore};

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::{best_index, ProgramComparator};
use crate::operators::generator::RampedHalfAndHalf;
use crate::operators::traits::{
    CrossoverOperator, MutationOperator, ProgramGenerator, SelectionOperator,
};
use crate::population::config::{ElitismOrder, PopulationConfig};
use crate::population::member_set::ProgramSet;
use crate::program::{PrimitiveSet, Program};

/// Lifecycle state of a population
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopulationState {
    /// Built but never filled
    Uninitialized,
    /// Filled by `init`
    Initialized,
    /// Advanced by at least one `step`
    Stepped,
}

/// What one call to [`Population::step`] produced
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Generation number after the step
    pub generation: usize,
    /// Crossover offspring kept
    pub crossover_offspring: usize,
    /// Crossover offspring discarded for exceeding `max_element_length`
    pub dropped_for_length: usize,
    /// Mutation offspring (never length-capped)
    pub mutation_offspring: usize,
    /// Members carried over from the previous generation
    pub elites: usize,
    /// Whether the previous best was added back with `keep_best`
    pub best_carried: bool,
    /// Freshly generated programs used to fill the remaining slots
    pub fresh: usize,
    /// Distinct members after deduplication
    pub members: usize,
}

/// Builder for [`Population`]
pub struct PopulationBuilder<C> {
    config: PopulationConfig,
    primitives: Arc<PrimitiveSet>,
    comparator: C,
    selection: Option<Box<dyn SelectionOperator>>,
    crossover: Option<Box<dyn CrossoverOperator>>,
    mutation: Option<Box<dyn MutationOperator>>,
    generator: Option<Box<dyn ProgramGenerator>>,
}

impl<C: ProgramComparator> PopulationBuilder<C> {
    /// Set the configuration
    pub fn config(mut self, config: PopulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the selection operator
    pub fn selection<S: SelectionOperator + 'static>(mut self, selection: S) -> Self {
        self.selection = Some(Box::new(selection));
        self
    }

    /// Set the crossover operator
    pub fn crossover<X: CrossoverOperator + 'static>(mut self, crossover: X) -> Self {
        self.crossover = Some(Box::new(crossover));
        self
    }

    /// Set the mutation operator
    pub fn mutation<M: MutationOperator + 'static>(mut self, mutation: M) -> Self {
        self.mutation = Some(Box::new(mutation));
        self
    }

    /// Set the program generator (ramped half-and-half if unset)
    pub fn generator<G: ProgramGenerator + 'static>(mut self, generator: G) -> Self {
        self.generator = Some(Box::new(generator));
        self
    }

    /// Build the population
    pub fn build(self) -> EvoResult<Population<C>> {
        self.config.validate()?;

        let selection = self.selection.ok_or_else(|| {
            EvolutionError::Configuration("Selection operator must be specified".to_string())
        })?;

        let crossover = self.crossover.ok_or_else(|| {
            EvolutionError::Configuration("Crossover operator must be specified".to_string())
        })?;

        let mutation = self.mutation.ok_or_else(|| {
            EvolutionError::Configuration("Mutation operator must be specified".to_string())
        })?;

        let generator = self
            .generator
            .unwrap_or_else(|| Box::new(RampedHalfAndHalf::default()));

        Ok(Population {
            members: ProgramSet::with_capacity(self.config.max_size),
            config: self.config,
            primitives: self.primitives,
            comparator: self.comparator,
            selection,
            crossover,
            mutation,
            generator,
            best: None,
            generation: 0,
            state: PopulationState::Uninitialized,
        })
    }
}

/// A bounded, deduplicated population of programs
pub struct Population<C> {
    config: PopulationConfig,
    primitives: Arc<PrimitiveSet>,
    comparator: C,
    selection: Box<dyn SelectionOperator>,
    crossover: Box<dyn CrossoverOperator>,
    mutation: Box<dyn MutationOperator>,
    generator: Box<dyn ProgramGenerator>,
    members: ProgramSet,
    best: Option<Program>,
    generation: usize,
    state: PopulationState,
}

impl<C: ProgramComparator> Population<C> {
    /// Start building a population over `primitives`, ranked by `comparator`
    pub fn builder(primitives: Arc<PrimitiveSet>, comparator: C) -> PopulationBuilder<C> {
        PopulationBuilder {
            config: PopulationConfig::default(),
            primitives,
            comparator,
            selection: None,
            crossover: None,
            mutation: None,
            generator: None,
        }
    }

    /// Fill the population from `seeds`, then from the generator
    ///
    /// At most `max_size` seeds are used; duplicates among them count once.
    /// Generation retries on duplicates and gives up with
    /// [`EvolutionError::CapacityExhausted`] after `max_init_retries`
    /// consecutive misses, in which case the current members are kept.
    pub fn init<R: Rng>(&mut self, seeds: &[Program], rng: &mut R) -> EvoResult<()> {
        self.init_with(seeds, rng)
    }

    /// Advance one generation
    ///
    /// An empty population is initialised first.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> EvoResult<GenerationReport> {
        self.step_with(rng)
    }

    fn init_with(&mut self, seeds: &[Program], rng: &mut dyn RngCore) -> EvoResult<()> {
        let target = self.config.max_size;
        let mut members = ProgramSet::with_capacity(target);
        let mut best: Option<Program> = None;

        for seed in seeds {
            if members.len() >= target {
                break;
            }
            if members.insert(seed.clone()) {
                self.track_best(&mut best, seed);
            }
        }
        let seeded = members.len();

        let mut duplicates = 0;
        while members.len() < target {
            let program =
                self.generator
                    .generate(&self.primitives, self.config.max_generation_depth, rng)?;
            if members.insert(program.clone()) {
                duplicates = 0;
                self.track_best(&mut best, &program);
                continue;
            }

            duplicates += 1;
            trace!("duplicate program during init: {}", program);
            if duplicates >= self.config.max_init_retries {
                return Err(EvolutionError::CapacityExhausted {
                    members: members.len(),
                    target,
                    retries: duplicates,
                });
            }
        }

        debug!(
            "initialised population: {} seeds, {} generated",
            seeded,
            members.len() - seeded
        );
        self.members = members;
        self.best = best;
        self.generation = 0;
        self.state = PopulationState::Initialized;
        Ok(())
    }

    fn step_with(&mut self, rng: &mut dyn RngCore) -> EvoResult<GenerationReport> {
        if self.members.is_empty() {
            self.init_with(&[], rng)?;
        }

        let max_size = self.config.max_size;
        let pool = self.selection.select(self.members.as_slice(), rng);
        if pool.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        let mut report = GenerationReport {
            generation: self.generation + 1,
            ..Default::default()
        };
        let mut candidates: Vec<Program> = Vec::with_capacity(max_size);

        for _ in 0..self.config.crossover_count() {
            let parent1 = &pool[rng.gen_range(0..pool.len())];
            let parent2 = &pool[rng.gen_range(0..pool.len())];
            let child = self.crossover.crossover(parent1, parent2, rng)?;
            if child.length() > self.config.max_element_length {
                trace!(
                    "dropping crossover offspring of length {} (max {})",
                    child.length(),
                    self.config.max_element_length
                );
                report.dropped_for_length += 1;
                continue;
            }
            candidates.push(child);
            report.crossover_offspring += 1;
        }

        for _ in 0..self.config.mutation_count() {
            let parent = &pool[rng.gen_range(0..pool.len())];
            candidates.push(self.mutation.mutate(parent, rng)?);
            report.mutation_offspring += 1;
        }

        let elites = self.elites(self.config.elitism_count());
        report.elites = elites.len();
        candidates.extend(elites);

        if self.config.keep_best {
            if let Some(best) = &self.best {
                if !candidates.contains(best) {
                    if candidates.len() >= max_size {
                        candidates.pop();
                    }
                    candidates.push(best.clone());
                    report.best_carried = true;
                }
            }
        }

        while candidates.len() < max_size {
            candidates.push(self.generator.generate(
                &self.primitives,
                self.config.max_generation_depth,
                rng,
            )?);
            report.fresh += 1;
        }

        let members: ProgramSet = candidates.into_iter().collect();
        let best = best_index(&self.comparator, members.as_slice())
            .map(|i| members.as_slice()[i].clone());

        self.members = members;
        self.best = best;
        self.generation += 1;
        self.state = PopulationState::Stepped;
        report.members = self.members.len();

        debug!(
            "generation {}: {} crossover ({} dropped), {} mutation, {} elites, {} fresh -> {} members",
            report.generation,
            report.crossover_offspring,
            report.dropped_for_length,
            report.mutation_offspring,
            report.elites,
            report.fresh,
            report.members
        );
        if report.members < max_size {
            warn!(
                "generation {} collapsed to {} distinct members (max {})",
                report.generation, report.members, max_size
            );
        }
        Ok(report)
    }

    fn elites(&self, count: usize) -> Vec<Program> {
        match self.config.elitism_order {
            ElitismOrder::Fittest => {
                let mut ranked = self.members.as_slice().to_vec();
                ranked.sort_by(|a, b| self.comparator.compare(b, a));
                ranked.truncate(count);
                ranked
            }
            ElitismOrder::ReverseInsertion => {
                self.members.iter().rev().take(count).cloned().collect()
            }
        }
    }

    fn track_best(&self, best: &mut Option<Program>, candidate: &Program) {
        let replace = match best {
            Some(current) => {
                self.comparator.compare(candidate, current) == std::cmp::Ordering::Greater
            }
            None => true,
        };
        if replace {
            *best = Some(candidate.clone());
        }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in insertion order
    pub fn members(&self) -> &[Program] {
        self.members.as_slice()
    }

    /// Iterate over members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Program> {
        self.members.iter()
    }

    /// Check whether a structurally equal program is a member
    pub fn contains(&self, program: &Program) -> bool {
        self.members.contains(program)
    }

    /// Comparator-maximal member as of the last `init` or `step`
    pub fn best_program(&self) -> Option<&Program> {
        self.best.as_ref()
    }

    /// Generations completed since the last `init`
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Lifecycle state
    pub fn state(&self) -> PopulationState {
        self.state
    }

    /// Configuration
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Primitive set programs are built from
    pub fn primitives(&self) -> &Arc<PrimitiveSet> {
        &self.primitives
    }

    /// Comparator used for selection, elitism and best tracking
    pub fn comparator(&self) -> &C {
        &self.comparator
    }
}

impl<C> fmt::Debug for Population<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Population")
            .field("config", &self.config)
            .field("members", &self.members.len())
            .field("best", &self.best)
            .field("generation", &self.generation)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
