//! Population configuration

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};

/// Order in which elites are drawn from the current generation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElitismOrder {
    /// Best first according to the population comparator (stable on ties)
    #[default]
    Fittest,
    /// Most recently inserted members first, regardless of fitness
    ReverseInsertion,
}

/// Configuration for a [`Population`](crate::population::Population)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Target number of distinct members
    pub max_size: usize,
    /// Depth bound handed to the program generator
    pub max_generation_depth: usize,
    /// Crossover offspring longer than this are discarded
    pub max_element_length: usize,
    /// Fraction of `max_size` produced by crossover each step
    pub crossover_percent: f64,
    /// Fraction of `max_size` produced by mutation each step
    pub mutation_percent: f64,
    /// Fraction of `max_size` carried over unchanged each step
    pub elitism_percent: f64,
    /// How elites are picked
    pub elitism_order: ElitismOrder,
    /// Carry the previous best into the next generation when it would be lost
    pub keep_best: bool,
    /// Consecutive duplicate draws tolerated while filling the initial population
    pub max_init_retries: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            max_generation_depth: 4,
            max_element_length: 50,
            crossover_percent: 0.65,
            mutation_percent: 0.2,
            elitism_percent: 0.1,
            elitism_order: ElitismOrder::Fittest,
            keep_best: false,
            max_init_retries: 1000,
        }
    }
}

impl PopulationConfig {
    /// Set the population size
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Set the generator depth bound
    pub fn with_max_generation_depth(mut self, depth: usize) -> Self {
        self.max_generation_depth = depth;
        self
    }

    /// Set the crossover offspring length cap
    pub fn with_max_element_length(mut self, length: usize) -> Self {
        self.max_element_length = length;
        self
    }

    /// Set the crossover share
    pub fn with_crossover_percent(mut self, percent: f64) -> Self {
        self.crossover_percent = percent;
        self
    }

    /// Set the mutation share
    pub fn with_mutation_percent(mut self, percent: f64) -> Self {
        self.mutation_percent = percent;
        self
    }

    /// Set the elitism share
    pub fn with_elitism_percent(mut self, percent: f64) -> Self {
        self.elitism_percent = percent;
        self
    }

    /// Set the elite ordering
    pub fn with_elitism_order(mut self, order: ElitismOrder) -> Self {
        self.elitism_order = order;
        self
    }

    /// Enable or disable best-program carry-over
    pub fn with_keep_best(mut self, keep_best: bool) -> Self {
        self.keep_best = keep_best;
        self
    }

    /// Set the duplicate retry cap used by `init`
    pub fn with_max_init_retries(mut self, retries: usize) -> Self {
        self.max_init_retries = retries;
        self
    }

    /// Number of crossover offspring attempted per step
    pub fn crossover_count(&self) -> usize {
        share(self.crossover_percent, self.max_size)
    }

    /// Number of mutation offspring per step
    pub fn mutation_count(&self) -> usize {
        share(self.mutation_percent, self.max_size)
    }

    /// Maximum number of elites per step
    pub fn elitism_count(&self) -> usize {
        share(self.elitism_percent, self.max_size)
    }

    /// Check the configuration for values the engine cannot run with
    pub fn validate(&self) -> EvoResult<()> {
        if self.max_size == 0 {
            return Err(EvolutionError::Configuration(
                "max_size must be positive".to_string(),
            ));
        }
        if self.max_element_length == 0 {
            return Err(EvolutionError::Configuration(
                "max_element_length must be positive".to_string(),
            ));
        }
        if self.max_init_retries == 0 {
            return Err(EvolutionError::Configuration(
                "max_init_retries must be positive".to_string(),
            ));
        }

        let shares = [
            ("crossover_percent", self.crossover_percent),
            ("mutation_percent", self.mutation_percent),
            ("elitism_percent", self.elitism_percent),
        ];
        for (name, value) in shares {
            if !(0.0..=1.0).contains(&value) {
                return Err(EvolutionError::Configuration(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }

        let total: f64 = shares.iter().map(|(_, v)| v).sum();
        if total > 1.0 + f64::EPSILON {
            return Err(EvolutionError::Configuration(format!(
                "crossover, mutation and elitism shares sum to {}, which exceeds 1",
                total
            )));
        }
        Ok(())
    }
}

fn share(percent: f64, size: usize) -> usize {
    (percent * size as f64).floor() as usize
}
