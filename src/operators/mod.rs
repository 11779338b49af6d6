//! Genetic operators
//!
//! This module provides program generators plus selection, crossover, and
//! mutation operators.

pub mod crossover;
pub mod generator;
pub mod mutation;
pub mod selection;
pub mod traits;
pub mod weighted;

pub mod prelude {
    pub use super::crossover::*;
    pub use super::generator::*;
    pub use super::mutation::*;
    pub use super::selection::*;
    pub use super::traits::*;
    pub use super::weighted::WeightedChoice;
}
