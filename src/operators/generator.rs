//! Random program generators
//!
//! Generators build the initial population and the fresh programs used to
//! top up each generation. Depth is counted from 0 at the root, so a tree of
//! depth `max_depth` has leaves `max_depth` edges below the root.

use rand::{Rng, RngCore};

use crate::error::{OperatorError, ProgramError};
use crate::operators::traits::ProgramGenerator;
use crate::operators::weighted::WeightedChoice;
use crate::program::{PrimitiveSet, Program};

/// The "full" method
///
/// Inner nodes are always functions, so every leaf sits exactly at
/// `max_depth`. With no functions registered the result is a single terminal.
#[derive(Clone, Debug, Default)]
pub struct FullGenerator;

impl FullGenerator {
    /// Create a new full generator
    pub fn new() -> Self {
        Self
    }

    fn generate_node(
        primitives: &PrimitiveSet,
        depth: usize,
        max_depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        if depth >= max_depth {
            return Program::leaf(primitives.random_terminal(rng).clone());
        }
        let Some(function) = primitives.random_function(rng).cloned() else {
            return Program::leaf(primitives.random_terminal(rng).clone());
        };

        let children = (0..function.arity())
            .map(|_| Self::generate_node(primitives, depth + 1, max_depth, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Program::new(function, children)
    }
}

impl ProgramGenerator for FullGenerator {
    fn generate(
        &self,
        primitives: &PrimitiveSet,
        max_depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        Self::generate_node(primitives, 0, max_depth, rng)
    }
}

/// The "grow" method
///
/// Every node above `max_depth` is drawn uniformly from terminals and
/// functions together, so branches may stop early.
#[derive(Clone, Debug, Default)]
pub struct GrowGenerator;

impl GrowGenerator {
    /// Create a new grow generator
    pub fn new() -> Self {
        Self
    }

    fn generate_node(
        primitives: &PrimitiveSet,
        depth: usize,
        max_depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        if depth >= max_depth {
            return Program::leaf(primitives.random_terminal(rng).clone());
        }

        let primitive = primitives.random_primitive(rng).clone();
        let children = (0..primitive.arity())
            .map(|_| Self::generate_node(primitives, depth + 1, max_depth, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Program::new(primitive, children)
    }
}

impl ProgramGenerator for GrowGenerator {
    fn generate(
        &self,
        primitives: &PrimitiveSet,
        max_depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        Self::generate_node(primitives, 0, max_depth, rng)
    }
}

/// Ramped half-and-half
///
/// Picks a depth uniformly in `[min_depth, max_depth]`, then uses the full or
/// grow method with equal probability.
#[derive(Clone, Debug)]
pub struct RampedHalfAndHalf {
    /// Smallest depth of the ramp
    pub min_depth: usize,
}

impl RampedHalfAndHalf {
    /// Create a ramped generator starting at `min_depth`
    pub fn new(min_depth: usize) -> Self {
        Self { min_depth }
    }
}

impl Default for RampedHalfAndHalf {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ProgramGenerator for RampedHalfAndHalf {
    fn generate(
        &self,
        primitives: &PrimitiveSet,
        max_depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        let depth = rng.gen_range(self.min_depth.min(max_depth)..=max_depth);
        if rng.gen() {
            FullGenerator.generate(primitives, depth, rng)
        } else {
            GrowGenerator.generate(primitives, depth, rng)
        }
    }
}

/// Weighted mixture of generators
#[derive(Debug)]
pub struct StochasticGenerator {
    generators: WeightedChoice<Box<dyn ProgramGenerator>>,
}

impl StochasticGenerator {
    /// Create a mixture from `(generator, weight)` entries
    pub fn new(entries: Vec<(Box<dyn ProgramGenerator>, f64)>) -> Result<Self, OperatorError> {
        Ok(Self {
            generators: WeightedChoice::new(entries)?,
        })
    }

    /// Create a mixture where every generator is equally likely
    pub fn uniform(generators: Vec<Box<dyn ProgramGenerator>>) -> Result<Self, OperatorError> {
        Ok(Self {
            generators: WeightedChoice::uniform(generators)?,
        })
    }
}

impl ProgramGenerator for StochasticGenerator {
    fn generate(
        &self,
        primitives: &PrimitiveSet,
        max_depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        self.generators
            .choose(rng)
            .generate(primitives, max_depth, rng)
    }
}
