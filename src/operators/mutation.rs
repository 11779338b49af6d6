//! Mutation operators
//!
//! Each operator returns a new program; the input tree is never modified.

use std::sync::Arc;

use rand::{Rng, RngCore};

use crate::error::{OperatorError, ProgramError};
use crate::operators::traits::{MutationOperator, ProgramGenerator};
use crate::operators::weighted::WeightedChoice;
use crate::program::{PrimitiveSet, Program};

fn random_index(program: &Program, rng: &mut dyn RngCore) -> usize {
    rng.gen_range(0..program.length())
}

/// Point mutation
///
/// Visits the tree bottom-up. Each node is, with `probability`, relabelled to
/// a random primitive of the same arity; its (possibly mutated) children are
/// kept.
#[derive(Clone, Debug)]
pub struct PointMutation {
    primitives: Arc<PrimitiveSet>,
    /// Per-node mutation probability
    pub probability: f64,
}

impl PointMutation {
    /// Create a point mutation with the given per-node probability
    pub fn new(primitives: Arc<PrimitiveSet>, probability: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&probability),
            "Probability must be in [0, 1]"
        );
        Self {
            primitives,
            probability,
        }
    }

    fn mutate_node(&self, node: &Program, rng: &mut dyn RngCore) -> Result<Program, ProgramError> {
        let children = node
            .children()
            .iter()
            .map(|child| self.mutate_node(child, rng))
            .collect::<Result<Vec<_>, _>>()?;

        let primitive = if rng.gen::<f64>() < self.probability {
            self.primitives
                .random_with_arity(node.arity(), rng)
                .unwrap_or(node.primitive())
                .clone()
        } else {
            node.primitive().clone()
        };
        Program::new(primitive, children)
    }
}

impl MutationOperator for PointMutation {
    fn mutate(&self, program: &Program, rng: &mut dyn RngCore) -> Result<Program, ProgramError> {
        self.mutate_node(program, rng)
    }
}

/// Shrink mutation
///
/// Replaces a random subtree with a random terminal.
#[derive(Clone, Debug)]
pub struct ShrinkMutation {
    primitives: Arc<PrimitiveSet>,
}

impl ShrinkMutation {
    /// Create a shrink mutation drawing terminals from `primitives`
    pub fn new(primitives: Arc<PrimitiveSet>) -> Self {
        Self { primitives }
    }
}

impl MutationOperator for ShrinkMutation {
    fn mutate(&self, program: &Program, rng: &mut dyn RngCore) -> Result<Program, ProgramError> {
        let point = random_index(program, rng);
        let terminal = Program::leaf(self.primitives.random_terminal(rng).clone())?;
        program.replace(point, terminal)
    }
}

/// Subtree mutation
///
/// Replaces a random subtree with a freshly generated one.
#[derive(Clone, Debug)]
pub struct SubtreeMutation<G> {
    generator: G,
    primitives: Arc<PrimitiveSet>,
    /// Depth bound handed to the generator
    pub max_depth: usize,
}

impl<G: ProgramGenerator> SubtreeMutation<G> {
    /// Create a subtree mutation
    pub fn new(generator: G, primitives: Arc<PrimitiveSet>, max_depth: usize) -> Self {
        Self {
            generator,
            primitives,
            max_depth,
        }
    }
}

impl<G: ProgramGenerator> MutationOperator for SubtreeMutation<G> {
    fn mutate(&self, program: &Program, rng: &mut dyn RngCore) -> Result<Program, ProgramError> {
        let point = random_index(program, rng);
        let fresh = self
            .generator
            .generate(&self.primitives, self.max_depth, rng)?;
        program.replace(point, fresh)
    }
}

/// Swap mutation
///
/// Reverses the children of a random node. Nodes with fewer than two
/// children leave the program unchanged.
#[derive(Clone, Debug, Default)]
pub struct SwapMutation;

impl SwapMutation {
    /// Create a new swap mutation
    pub fn new() -> Self {
        Self
    }
}

impl MutationOperator for SwapMutation {
    fn mutate(&self, program: &Program, rng: &mut dyn RngCore) -> Result<Program, ProgramError> {
        let point = random_index(program, rng);
        let node = program.program_at(point)?;
        if node.children().len() < 2 {
            return Ok(program.clone());
        }

        let reversed: Vec<Program> = node.children().iter().rev().cloned().collect();
        let swapped = node.create_new(reversed)?;
        program.replace(point, swapped)
    }
}

/// Hoist mutation
///
/// Returns a random sub-program as the whole offspring.
#[derive(Clone, Debug, Default)]
pub struct HoistMutation;

impl HoistMutation {
    /// Create a new hoist mutation
    pub fn new() -> Self {
        Self
    }
}

impl MutationOperator for HoistMutation {
    fn mutate(&self, program: &Program, rng: &mut dyn RngCore) -> Result<Program, ProgramError> {
        let point = random_index(program, rng);
        Ok(program.program_at(point)?.clone())
    }
}

/// Weighted mixture of mutation operators
#[derive(Debug)]
pub struct StochasticMutation {
    operators: WeightedChoice<Box<dyn MutationOperator>>,
}

impl StochasticMutation {
    /// Create a mixture from `(operator, weight)` entries
    pub fn new(entries: Vec<(Box<dyn MutationOperator>, f64)>) -> Result<Self, OperatorError> {
        Ok(Self {
            operators: WeightedChoice::new(entries)?,
        })
    }

    /// Create a mixture where every operator is equally likely
    pub fn uniform(operators: Vec<Box<dyn MutationOperator>>) -> Result<Self, OperatorError> {
        Ok(Self {
            operators: WeightedChoice::uniform(operators)?,
        })
    }
}

impl MutationOperator for StochasticMutation {
    fn mutate(&self, program: &Program, rng: &mut dyn RngCore) -> Result<Program, ProgramError> {
        self.operators.choose(rng).mutate(program, rng)
    }
}
