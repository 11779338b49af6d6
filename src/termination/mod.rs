//! Termination criteria
//!
//! `step` never stops on its own. These criteria give callers a stopping rule,
//! and [`Population::evolve`] runs the loop until one fires.

use log::info;
use rand::Rng;

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::{Fitness, ProgramComparator};
use crate::population::Population;
use crate::program::Program;

/// Evolution state for termination checking
#[derive(Clone, Debug)]
pub struct EvolutionState<'a> {
    /// Generations completed so far
    pub generation: usize,
    /// Fitness of the current best program
    pub best_fitness: f64,
    /// Current number of distinct members
    pub population_size: usize,
    /// Best fitness recorded for each generation so far
    pub fitness_history: &'a [f64],
}

/// Termination criterion trait
pub trait TerminationCriterion: Send + Sync {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

/// Terminate after a maximum number of generations
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    /// Create a new max generations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxGenerations {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate when fitness improvement stagnates
#[derive(Clone, Debug)]
pub struct FitnessStagnation {
    /// Number of generations to look back
    pub window: usize,
    /// Minimum improvement threshold
    pub epsilon: f64,
}

impl FitnessStagnation {
    /// Create a new fitness stagnation criterion
    pub fn new(window: usize, epsilon: f64) -> Self {
        Self { window, epsilon }
    }
}

impl TerminationCriterion for FitnessStagnation {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        if self.window == 0 || state.fitness_history.len() < self.window {
            return false;
        }

        let window = &state.fitness_history[state.fitness_history.len() - self.window..];
        let first = window[0];
        let last = window[window.len() - 1];

        (last - first).abs() < self.epsilon
    }

    fn reason(&self) -> &'static str {
        "Fitness stagnation detected"
    }
}

/// Terminate when target fitness is reached
#[derive(Clone, Debug)]
pub struct TargetFitness {
    /// Target fitness value
    pub target: f64,
    /// Tolerance for reaching target
    pub tolerance: f64,
}

impl TargetFitness {
    /// Create a new target fitness criterion
    pub fn new(target: f64) -> Self {
        Self {
            target,
            tolerance: 0.0,
        }
    }

    /// Create with a tolerance
    pub fn with_tolerance(target: f64, tolerance: f64) -> Self {
        Self { target, tolerance }
    }
}

impl TerminationCriterion for TargetFitness {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        state.best_fitness >= self.target - self.tolerance
    }

    fn reason(&self) -> &'static str {
        "Target fitness reached"
    }
}

/// Combine criteria with OR logic (any one triggers termination)
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    /// Create a new AnyOf combinator
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }
}

impl TerminationCriterion for AnyOf {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        self.criteria.iter().any(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "One of multiple criteria met"
    }
}

/// Combine criteria with AND logic (all must trigger for termination)
pub struct AllOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AllOf {
    /// Create a new AllOf combinator
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }
}

impl TerminationCriterion for AllOf {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        !self.criteria.is_empty() && self.criteria.iter().all(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "All criteria met"
    }
}

/// Outcome of [`Population::evolve`]
#[derive(Clone, Debug)]
pub struct EvolutionSummary {
    /// Best program at termination
    pub best: Program,
    /// Its fitness
    pub best_fitness: f64,
    /// Generations completed
    pub generations: usize,
    /// Best fitness per generation, starting with the initial population
    pub fitness_history: Vec<f64>,
    /// Why the run stopped
    pub reason: &'static str,
}

impl<C: ProgramComparator> Population<C> {
    /// Step until `criterion` fires
    ///
    /// The criterion is checked before every step, starting with the initial
    /// population (initialised here if needed). `fitness` only feeds the
    /// recorded history; ranking stays with the population's comparator.
    pub fn evolve<F, T, R>(
        &mut self,
        fitness: &F,
        criterion: &T,
        rng: &mut R,
    ) -> EvoResult<EvolutionSummary>
    where
        F: Fitness + ?Sized,
        T: TerminationCriterion + ?Sized,
        R: Rng,
    {
        if self.is_empty() {
            self.init(&[], rng)?;
        }

        let mut fitness_history = Vec::new();
        loop {
            let best = self
                .best_program()
                .ok_or(EvolutionError::EmptyPopulation)?
                .clone();
            let best_fitness = fitness.evaluate(&best);
            fitness_history.push(best_fitness);

            let state = EvolutionState {
                generation: self.generation(),
                best_fitness,
                population_size: self.len(),
                fitness_history: &fitness_history,
            };
            if criterion.should_terminate(&state) {
                info!(
                    "evolution stopped after {} generations: {} (best fitness {})",
                    self.generation(),
                    criterion.reason(),
                    best_fitness
                );
                return Ok(EvolutionSummary {
                    best,
                    best_fitness,
                    generations: self.generation(),
                    fitness_history,
                    reason: criterion.reason(),
                });
            }

            self.step(rng)?;
        }
    }
}

pub mod prelude {
    pub use super::{
        AllOf, AnyOf, EvolutionState, EvolutionSummary, FitnessStagnation, MaxGenerations,
        TargetFitness, TerminationCriterion,
    };
}
