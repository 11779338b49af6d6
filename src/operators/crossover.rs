//! Crossover operators
//!
//! Every operator produces a single offspring and returns `parent1` unchanged
//! when the two parents are structurally equal.

use rand::seq::IteratorRandom;
use rand::{Rng, RngCore};

use crate::error::{OperatorError, ProgramError};
use crate::operators::traits::CrossoverOperator;
use crate::operators::weighted::WeightedChoice;
use crate::program::Program;

/// Subtree crossover
///
/// A function node of `parent1` is replaced by a random sub-program of
/// `parent2`. When `parent1` is a lone terminal the offspring is `parent2`.
#[derive(Clone, Debug, Default)]
pub struct SubtreeCrossover;

impl SubtreeCrossover {
    /// Create a new subtree crossover
    pub fn new() -> Self {
        Self
    }
}

impl CrossoverOperator for SubtreeCrossover {
    fn crossover(
        &self,
        parent1: &Program,
        parent2: &Program,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        if parent1 == parent2 {
            return Ok(parent1.clone());
        }

        let Some(&point1) = parent1.function_indexes().iter().choose(rng) else {
            return Ok(parent2.clone());
        };
        let point2 = rng.gen_range(0..parent2.length());
        parent1.replace(point1, parent2.program_at(point2)?.clone())
    }
}

/// One-point crossover over the common region
///
/// The crossover point is drawn from positions where both parents share the
/// same shape, so the swapped subtrees occupy equivalent contexts.
#[derive(Clone, Debug, Default)]
pub struct OnePointCrossover;

impl OnePointCrossover {
    /// Create a new one-point crossover
    pub fn new() -> Self {
        Self
    }
}

impl CrossoverOperator for OnePointCrossover {
    fn crossover(
        &self,
        parent1: &Program,
        parent2: &Program,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        if parent1 == parent2 {
            return Ok(parent1.clone());
        }

        let region = parent1.common_region_indexes(parent2);
        match region.iter().choose(rng) {
            Some((&point1, &point2)) => {
                parent1.replace(point1, parent2.program_at(point2)?.clone())
            }
            None => Ok(parent1.clone()),
        }
    }
}

/// Context-preserving crossover
///
/// Swaps the subtrees found at the same pre-order index in both parents. No
/// shape check is made, so the contexts only line up where the parents agree.
#[derive(Clone, Debug, Default)]
pub struct ContextPreservingCrossover;

impl ContextPreservingCrossover {
    /// Create a new context-preserving crossover
    pub fn new() -> Self {
        Self
    }
}

impl CrossoverOperator for ContextPreservingCrossover {
    fn crossover(
        &self,
        parent1: &Program,
        parent2: &Program,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        if parent1 == parent2 {
            return Ok(parent1.clone());
        }

        let point = rng.gen_range(0..parent1.length().min(parent2.length()));
        parent1.replace(point, parent2.program_at(point)?.clone())
    }
}

/// Uniform crossover
///
/// Walks both parents together. Where the nodes take the same number of
/// children a fair coin picks whose node is kept and the walk recurses; where
/// they differ the coin picks a whole subtree.
#[derive(Clone, Debug, Default)]
pub struct UniformCrossover;

impl UniformCrossover {
    /// Create a new uniform crossover
    pub fn new() -> Self {
        Self
    }

    fn cross_node(
        a: &Program,
        b: &Program,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        let pick_a: bool = rng.gen();
        if a.arity() != b.arity() {
            return Ok(if pick_a { a.clone() } else { b.clone() });
        }

        let children = a
            .children()
            .iter()
            .zip(b.children())
            .map(|(ca, cb)| Self::cross_node(ca, cb, rng))
            .collect::<Result<Vec<_>, _>>()?;
        if pick_a {
            a.create_new(children)
        } else {
            b.create_new(children)
        }
    }
}

impl CrossoverOperator for UniformCrossover {
    fn crossover(
        &self,
        parent1: &Program,
        parent2: &Program,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        if parent1 == parent2 {
            return Ok(parent1.clone());
        }
        Self::cross_node(parent1, parent2, rng)
    }
}

/// Weighted mixture of crossover operators
#[derive(Debug)]
pub struct StochasticCrossover {
    operators: WeightedChoice<Box<dyn CrossoverOperator>>,
}

impl StochasticCrossover {
    /// Create a mixture from `(operator, weight)` entries
    pub fn new(entries: Vec<(Box<dyn CrossoverOperator>, f64)>) -> Result<Self, OperatorError> {
        Ok(Self {
            operators: WeightedChoice::new(entries)?,
        })
    }

    /// Create a mixture where every operator is equally likely
    pub fn uniform(operators: Vec<Box<dyn CrossoverOperator>>) -> Result<Self, OperatorError> {
        Ok(Self {
            operators: WeightedChoice::uniform(operators)?,
        })
    }
}

impl CrossoverOperator for StochasticCrossover {
    fn crossover(
        &self,
        parent1: &Program,
        parent2: &Program,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        self.operators
            .choose(rng)
            .crossover(parent1, parent2, rng)
    }
}
