//! Program trees and the primitives they are built from
//!
//! This module provides the immutable [`Program`] tree, the [`Primitive`]
//! kinds carried by its nodes, and the [`PrimitiveSet`] defining a run's
//! search space.

pub mod node;
pub mod primitive;
pub mod primitive_set;

pub use node::{PreOrder, Program};
pub use primitive::Primitive;
pub use primitive_set::{PrimitiveSet, PrimitiveSetBuilder};

pub mod prelude {
    pub use super::node::*;
    pub use super::primitive::*;
    pub use super::primitive_set::*;
}
