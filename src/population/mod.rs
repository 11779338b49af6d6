//! Population management
//!
//! This module provides the configuration, member set and generational loop.

pub mod config;
pub mod member_set;
#[allow(clippy::module_inception)]
pub mod population;

pub use config::{ElitismOrder, PopulationConfig};
pub use member_set::ProgramSet;
pub use population::{GenerationReport, Population, PopulationBuilder, PopulationState};

pub mod prelude {
    pub use super::config::*;
    pub use super::member_set::*;
    pub use super::population::*;
}
