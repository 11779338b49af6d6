//! Fitness evaluation
//!
//! This module provides the fitness and comparator contracts.

pub mod traits;

pub mod prelude {
    pub use super::traits::*;
}
