//! Operator traits
//!
//! This module defines the core operator traits for genetic programming.
//!
//! Operators take randomness as `&mut dyn RngCore` so that different operator
//! types can be mixed behind trait objects (see the `Stochastic*` delegates).

use std::fmt::Debug;

use rand::RngCore;

use crate::error::ProgramError;
use crate::program::{PrimitiveSet, Program};

/// Random program generator trait
///
/// Builds a random tree from a primitive set, bounded by depth.
pub trait ProgramGenerator: Send + Sync + Debug {
    /// Generate a program whose depth does not exceed `max_depth`
    fn generate(
        &self,
        primitives: &PrimitiveSet,
        max_depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError>;
}

/// Selection operator trait
///
/// Builds the mating pool for one generation.
pub trait SelectionOperator: Send + Sync + Debug {
    /// Select `population.len()` programs, sampled with replacement
    fn select(&self, population: &[Program], rng: &mut dyn RngCore) -> Vec<Program>;
}

/// Crossover operator trait
///
/// Combines genetic material from two parents into one offspring.
pub trait CrossoverOperator: Send + Sync + Debug {
    /// Apply crossover to two parents and produce one offspring
    fn crossover(
        &self,
        parent1: &Program,
        parent2: &Program,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError>;
}

/// Mutation operator trait
///
/// Produces a randomly altered copy of a program.
pub trait MutationOperator: Send + Sync + Debug {
    /// Apply mutation, returning the offspring
    fn mutate(&self, program: &Program, rng: &mut dyn RngCore) -> Result<Program, ProgramError>;
}

impl<T: ProgramGenerator + ?Sized> ProgramGenerator for Box<T> {
    fn generate(
        &self,
        primitives: &PrimitiveSet,
        max_depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        (**self).generate(primitives, max_depth, rng)
    }
}

impl<T: SelectionOperator + ?Sized> SelectionOperator for Box<T> {
    fn select(&self, population: &[Program], rng: &mut dyn RngCore) -> Vec<Program> {
        (**self).select(population, rng)
    }
}

impl<T: CrossoverOperator + ?Sized> CrossoverOperator for Box<T> {
    fn crossover(
        &self,
        parent1: &Program,
        parent2: &Program,
        rng: &mut dyn RngCore,
    ) -> Result<Program, ProgramError> {
        (**self).crossover(parent1, parent2, rng)
    }
}

impl<T: MutationOperator + ?Sized> MutationOperator for Box<T> {
    fn mutate(&self, program: &Program, rng: &mut dyn RngCore) -> Result<Program, ProgramError> {
        (**self).mutate(program, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::program::Primitive;

    // Mock selection operator for testing
    #[derive(Debug)]
    struct MockSelection;

    impl SelectionOperator for MockSelection {
        fn select(&self, population: &[Program], rng: &mut dyn RngCore) -> Vec<Program> {
            (0..population.len())
                .map(|_| population[rng.gen_range(0..population.len())].clone())
                .collect()
        }
    }

    // Mock crossover operator for testing
    #[derive(Debug)]
    struct MockCrossover;

    impl CrossoverOperator for MockCrossover {
        fn crossover(
            &self,
            _parent1: &Program,
            parent2: &Program,
            _rng: &mut dyn RngCore,
        ) -> Result<Program, ProgramError> {
            Ok(parent2.clone())
        }
    }

    // Mock mutation operator for testing
    #[derive(Debug)]
    struct MockMutation;

    impl MutationOperator for MockMutation {
        fn mutate(&self, program: &Program, _rng: &mut dyn RngCore) -> Result<Program, ProgramError> {
            Program::new(Primitive::Neg, vec![program.clone()])
        }
    }

    #[test]
    fn test_mock_selection_through_box() {
        let mut rng = StdRng::seed_from_u64(1);
        let population: Vec<Program> = (0..10).map(|i| Program::constant(i as f64)).collect();

        let selection: Box<dyn SelectionOperator> = Box::new(MockSelection);
        let pool = selection.select(&population, &mut rng);
        assert_eq!(pool.len(), population.len());
        for program in pool {
            assert!(population.contains(&program));
        }
    }

    #[test]
    fn test_mock_crossover_through_box() {
        let mut rng = StdRng::seed_from_u64(1);
        let crossover: Box<dyn CrossoverOperator> = Box::new(MockCrossover);
        let child = crossover
            .crossover(&Program::constant(1.0), &Program::constant(2.0), &mut rng)
            .unwrap();
        assert_eq!(child, Program::constant(2.0));
    }

    #[test]
    fn test_mock_mutation_through_box() {
        let mut rng = StdRng::seed_from_u64(1);
        let mutation: Box<dyn MutationOperator> = Box::new(MockMutation);
        let child = mutation.mutate(&Program::variable("x", 0), &mut rng).unwrap();
        assert_eq!(child.expression(), "neg(x)");
    }
}
