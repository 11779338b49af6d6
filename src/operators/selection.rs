//! Selection operators
//!
//! Each operator turns the current population into a mating pool of the same
//! size, sampled with replacement.

use std::cmp::Ordering;
use std::fmt;

use rand::seq::index;
use rand::{Rng, RngCore};

use crate::error::OperatorError;
use crate::fitness::traits::{Fitness, ProgramComparator};
use crate::operators::traits::SelectionOperator;
use crate::operators::weighted::WeightedChoice;
use crate::program::Program;

/// Tournament selection operator
///
/// Each pool slot is the best of `tournament_size` distinct individuals drawn
/// uniformly at random. The size is clamped to `[1, population.len()]`.
#[derive(Clone)]
pub struct TournamentSelection<C> {
    comparator: C,
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl<C: ProgramComparator> TournamentSelection<C> {
    /// Create a new tournament selection with the given size
    pub fn new(comparator: C, tournament_size: usize) -> Self {
        Self {
            comparator,
            tournament_size,
        }
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary(comparator: C) -> Self {
        Self::new(comparator, 2)
    }

    fn tournament<'a>(&self, population: &'a [Program], rng: &mut dyn RngCore) -> &'a Program {
        let size = self.tournament_size.clamp(1, population.len());
        let mut contestants = index::sample(rng, population.len(), size).into_iter();

        let mut best = &population[contestants.next().unwrap_or(0)];
        for i in contestants {
            let challenger = &population[i];
            if self.comparator.compare(challenger, best) == Ordering::Greater {
                best = challenger;
            }
        }
        best
    }
}

impl<C> fmt::Debug for TournamentSelection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TournamentSelection")
            .field("tournament_size", &self.tournament_size)
            .finish_non_exhaustive()
    }
}

impl<C: ProgramComparator> SelectionOperator for TournamentSelection<C> {
    fn select(&self, population: &[Program], rng: &mut dyn RngCore) -> Vec<Program> {
        if population.is_empty() {
            return Vec::new();
        }
        (0..population.len())
            .map(|_| self.tournament(population, rng).clone())
            .collect()
    }
}

/// Source of the sampling pointers a roulette wheel walks with
pub trait PointerScheme: Send + Sync + fmt::Debug {
    /// Produce `count` pointers in `[0, 1)`
    fn pointers(&self, count: usize, rng: &mut dyn RngCore) -> Vec<f64>;
}

/// Evenly spaced pointers sharing one random offset
///
/// This is stochastic universal sampling: one draw positions all `count`
/// pointers `1 / count` apart.
#[derive(Clone, Debug, Default)]
pub struct UniformPointers;

impl PointerScheme for UniformPointers {
    fn pointers(&self, count: usize, rng: &mut dyn RngCore) -> Vec<f64> {
        if count == 0 {
            return Vec::new();
        }
        let step = 1.0 / count as f64;
        let offset = rng.gen::<f64>() * step;
        (0..count).map(|i| offset + i as f64 * step).collect()
    }
}

/// Independent uniform pointers (classic roulette spins)
#[derive(Clone, Debug, Default)]
pub struct RandomPointers;

impl PointerScheme for RandomPointers {
    fn pointers(&self, count: usize, rng: &mut dyn RngCore) -> Vec<f64> {
        (0..count).map(|_| rng.gen::<f64>()).collect()
    }
}

/// Roulette wheel selection (fitness proportionate)
///
/// Each individual owns a bracket of the cumulative fitness curve as wide as
/// its fitness. Negative fitness shifts every value so the minimum becomes 1;
/// when no usable total remains all brackets get equal width.
#[derive(Clone)]
pub struct RouletteWheelSelection<F, P = UniformPointers> {
    fitness: F,
    pointers: P,
}

impl<F: Fitness> RouletteWheelSelection<F, UniformPointers> {
    /// Create a roulette wheel using stochastic universal sampling
    pub fn new(fitness: F) -> Self {
        Self {
            fitness,
            pointers: UniformPointers,
        }
    }
}

impl<F: Fitness, P: PointerScheme> RouletteWheelSelection<F, P> {
    /// Create a roulette wheel with a specific pointer scheme
    pub fn with_pointers(fitness: F, pointers: P) -> Self {
        Self { fitness, pointers }
    }

    fn cumulative_weights(&self, population: &[Program]) -> Vec<f64> {
        let fitnesses: Vec<f64> = population
            .iter()
            .map(|p| self.fitness.evaluate(p))
            .map(|f| if f.is_nan() { 0.0 } else { f })
            .collect();

        let min_fitness = fitnesses.iter().copied().fold(f64::INFINITY, f64::min);
        let offset = if min_fitness < 0.0 {
            -min_fitness + 1.0
        } else {
            0.0
        };

        let mut weights: Vec<f64> = fitnesses.iter().map(|f| f + offset).collect();
        let total: f64 = weights.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            weights = vec![1.0; population.len()];
        }

        let mut running = 0.0;
        weights
            .into_iter()
            .map(|w| {
                running += w;
                running
            })
            .collect()
    }
}

impl<F, P: fmt::Debug> fmt::Debug for RouletteWheelSelection<F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouletteWheelSelection")
            .field("pointers", &self.pointers)
            .finish_non_exhaustive()
    }
}

impl<F: Fitness, P: PointerScheme> SelectionOperator for RouletteWheelSelection<F, P> {
    fn select(&self, population: &[Program], rng: &mut dyn RngCore) -> Vec<Program> {
        if population.is_empty() {
            return Vec::new();
        }

        let cumulative = self.cumulative_weights(population);
        let total = cumulative[cumulative.len() - 1];

        let mut pointers = self.pointers.pointers(population.len(), rng);
        pointers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let last = population.len() - 1;
        let mut current = 0;
        pointers
            .into_iter()
            .map(|pointer| {
                let target = pointer * total;
                while current < last && cumulative[current] <= target {
                    current += 1;
                }
                population[current].clone()
            })
            .collect()
    }
}

/// Weighted mixture of selection operators
#[derive(Debug)]
pub struct StochasticSelection {
    operators: WeightedChoice<Box<dyn SelectionOperator>>,
}

impl StochasticSelection {
    /// Create a mixture from `(operator, weight)` entries
    pub fn new(entries: Vec<(Box<dyn SelectionOperator>, f64)>) -> Result<Self, OperatorError> {
        Ok(Self {
            operators: WeightedChoice::new(entries)?,
        })
    }

    /// Create a mixture where every operator is equally likely
    pub fn uniform(operators: Vec<Box<dyn SelectionOperator>>) -> Result<Self, OperatorError> {
        Ok(Self {
            operators: WeightedChoice::uniform(operators)?,
        })
    }
}

impl SelectionOperator for StochasticSelection {
    fn select(&self, population: &[Program], rng: &mut dyn RngCore) -> Vec<Program> {
        self.operators.choose(rng).select(population, rng)
    }
}
