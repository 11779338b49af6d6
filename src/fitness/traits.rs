//! Fitness traits
//!
//! This module defines the two contracts the engine needs from a problem:
//! a scalar [`Fitness`] score and a [`ProgramComparator`] ordering.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::program::Program;

/// Fitness evaluation trait
///
/// Higher is better by convention.
pub trait Fitness: Send + Sync {
    /// Evaluate a program
    fn evaluate(&self, program: &Program) -> f64;
}

impl<F> Fitness for F
where
    F: Fn(&Program) -> f64 + Send + Sync,
{
    fn evaluate(&self, program: &Program) -> f64 {
        self(program)
    }
}

/// Total order over programs used by selection and best-program tracking
///
/// `Ordering::Greater` means `a` is the better program.
pub trait ProgramComparator: Send + Sync {
    /// Compare two programs
    fn compare(&self, a: &Program, b: &Program) -> Ordering;
}

impl<C: ProgramComparator + ?Sized> ProgramComparator for Arc<C> {
    fn compare(&self, a: &Program, b: &Program) -> Ordering {
        (**self).compare(a, b)
    }
}

impl<C: ProgramComparator + ?Sized> ProgramComparator for &C {
    fn compare(&self, a: &Program, b: &Program) -> Ordering {
        (**self).compare(a, b)
    }
}

/// Comparator that ranks programs by a fitness function
///
/// NaN fitness ranks below every other value.
#[derive(Clone, Debug)]
pub struct FitnessComparator<F> {
    fitness: F,
}

impl<F: Fitness> FitnessComparator<F> {
    /// Create a comparator from a fitness function
    pub fn new(fitness: F) -> Self {
        Self { fitness }
    }

    /// The wrapped fitness function
    pub fn fitness(&self) -> &F {
        &self.fitness
    }
}

impl<F: Fitness> ProgramComparator for FitnessComparator<F> {
    fn compare(&self, a: &Program, b: &Program) -> Ordering {
        compare_fitness(self.fitness.evaluate(a), self.fitness.evaluate(b))
    }
}

impl<F: Fitness> Fitness for FitnessComparator<F> {
    fn evaluate(&self, program: &Program) -> f64 {
        self.fitness.evaluate(program)
    }
}

/// Compare two fitness values, ranking NaN lowest
pub fn compare_fitness(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Index of the comparator-maximal program; ties keep the first seen
pub fn best_index<C: ProgramComparator + ?Sized>(
    comparator: &C,
    programs: &[Program],
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, candidate) in programs.iter().enumerate() {
        match best {
            Some(b) if comparator.compare(candidate, &programs[b]) != Ordering::Greater => {}
            _ => best = Some(i),
        }
    }
    best
}
