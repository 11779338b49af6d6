//! # gp-evo
//!
//! A generational genetic programming library for Rust.
//!
//! Candidate solutions are immutable expression trees ([`program::Program`])
//! built from a [`program::PrimitiveSet`]. A [`population::Population`] keeps a
//! bounded set of distinct programs and advances it one generation at a time
//! through pluggable selection, crossover and mutation operators.
//!
//! ## Core Concepts
//!
//! - **Structural sharing**: edits return new trees that reuse untouched subtrees
//! - **Pre-order indexing**: every operator addresses sub-programs by index
//! - **Explicit randomness**: callers pass the RNG, so a seeded run is reproducible
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gp_evo::prelude::*;
//! use rand::SeedableRng;
//! use std::sync::Arc;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let primitives = Arc::new(PrimitiveSet::arithmetic(&["x"])?);
//!
//! // Fit x^2 + x on a few sample points.
//! let fitness = |p: &Program| {
//!     -(-5..=5)
//!         .map(|i| {
//!             let x = i as f64;
//!             (p.evaluate(&[x]) - (x * x + x)).abs()
//!         })
//!         .sum::<f64>()
//! };
//!
//! let mut population = Population::builder(primitives.clone(), FitnessComparator::new(fitness))
//!     .selection(TournamentSelection::new(FitnessComparator::new(fitness), 3))
//!     .crossover(SubtreeCrossover)
//!     .mutation(PointMutation::new(primitives, 0.1))
//!     .build()?;
//!
//! let summary = population.evolve(&fitness, &MaxGenerations::new(50), &mut rng)?;
//! println!("{} -> {}", summary.best, summary.best_fitness);
//! ```

pub mod error;
pub mod fitness;
pub mod operators;
pub mod population;
pub mod program;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::program::prelude::*;
    pub use crate::termination::prelude::*;
}
