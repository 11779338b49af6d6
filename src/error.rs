//! Error types for gp-evo
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for structural program operations
///
/// These signal a caller or operator bug (a bad index or a child list that
/// does not fit a primitive) and are never recovered locally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProgramError {
    /// A pre-order index fell outside `[0, length)`
    #[error("Index {index} out of range for program of length {length}")]
    IndexOutOfRange { index: usize, length: usize },

    /// A node was rebuilt with the wrong number of children
    #[error("Arity mismatch for '{label}': expected {expected} children, got {actual}")]
    ArityMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },

    /// A primitive was registered in the wrong collection
    #[error("Invalid primitive: {0}")]
    InvalidPrimitive(String),
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Invalid operator configuration
    #[error("Invalid operator configuration: {0}")]
    InvalidConfiguration(String),
}

/// Top-level error type for evolution operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvolutionError {
    /// Structural program error raised inside an operator
    #[error("Program error: {0}")]
    Program(#[from] ProgramError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The generator could not produce enough distinct programs
    #[error(
        "Capacity exhausted: only {members} of {target} distinct programs after {retries} consecutive duplicates"
    )]
    CapacityExhausted {
        /// Distinct programs collected before giving up
        members: usize,
        /// Requested population size
        target: usize,
        /// Consecutive duplicate draws that triggered the failure
        retries: usize,
    },

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;
