//! Primitive sets
//!
//! A [`PrimitiveSet`] fixes the search space of a run: the terminals that may
//! appear as leaves and the functions that may appear as inner nodes.

use std::collections::BTreeMap;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::ProgramError;
use crate::program::primitive::Primitive;

/// Immutable registry of terminal and function primitives
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PrimitiveSetRepr", into = "PrimitiveSetRepr")]
pub struct PrimitiveSet {
    terminals: Vec<Primitive>,
    functions: Vec<Primitive>,
    by_arity: BTreeMap<usize, Vec<Primitive>>,
}

impl PrimitiveSet {
    /// Create a primitive set
    ///
    /// Terminals must have arity 0 and functions arity >= 1; at least one
    /// terminal is required. Duplicates are dropped, keeping the first one.
    pub fn new(terminals: Vec<Primitive>, functions: Vec<Primitive>) -> Result<Self, ProgramError> {
        if let Some(bad) = terminals.iter().find(|p| p.is_function()) {
            return Err(ProgramError::InvalidPrimitive(format!(
                "'{}' has arity {} and cannot be a terminal",
                bad.label(),
                bad.arity()
            )));
        }
        if let Some(bad) = functions.iter().find(|p| p.is_terminal()) {
            return Err(ProgramError::InvalidPrimitive(format!(
                "'{}' has arity 0 and cannot be a function",
                bad.label()
            )));
        }
        if terminals.is_empty() {
            return Err(ProgramError::InvalidPrimitive(
                "a primitive set needs at least one terminal".to_string(),
            ));
        }

        let terminals = dedup(terminals);
        let functions = dedup(functions);

        let mut by_arity: BTreeMap<usize, Vec<Primitive>> = BTreeMap::new();
        for primitive in terminals.iter().chain(functions.iter()) {
            by_arity
                .entry(primitive.arity())
                .or_default()
                .push(primitive.clone());
        }

        Ok(Self {
            terminals,
            functions,
            by_arity,
        })
    }

    /// Start building a primitive set
    pub fn builder() -> PrimitiveSetBuilder {
        PrimitiveSetBuilder::default()
    }

    /// Arithmetic preset: one variable per name, constants 0 and 1, and
    /// `+ - * /`
    pub fn arithmetic(variables: &[&str]) -> Result<Self, ProgramError> {
        let mut builder = Self::builder();
        for (index, name) in variables.iter().enumerate() {
            builder = builder.variable(*name, index);
        }
        builder
            .constant(0.0)
            .constant(1.0)
            .function(Primitive::Add)
            .function(Primitive::Sub)
            .function(Primitive::Mul)
            .function(Primitive::Div)
            .build()
    }

    /// Arity-0 primitives
    pub fn terminals(&self) -> &[Primitive] {
        &self.terminals
    }

    /// Arity >= 1 primitives
    pub fn functions(&self) -> &[Primitive] {
        &self.functions
    }

    /// All primitives with the given arity
    pub fn with_arity(&self, arity: usize) -> &[Primitive] {
        self.by_arity.get(&arity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of primitives
    pub fn len(&self) -> usize {
        self.terminals.len() + self.functions.len()
    }

    /// Always false: a primitive set holds at least one terminal
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Uniformly random terminal
    pub fn random_terminal(&self, rng: &mut dyn RngCore) -> &Primitive {
        &self.terminals[rng.gen_range(0..self.terminals.len())]
    }

    /// Uniformly random function, if any are registered
    pub fn random_function(&self, rng: &mut dyn RngCore) -> Option<&Primitive> {
        if self.functions.is_empty() {
            None
        } else {
            Some(&self.functions[rng.gen_range(0..self.functions.len())])
        }
    }

    /// Uniformly random primitive from terminals and functions together
    pub fn random_primitive(&self, rng: &mut dyn RngCore) -> &Primitive {
        let index = rng.gen_range(0..self.len());
        if index < self.terminals.len() {
            &self.terminals[index]
        } else {
            &self.functions[index - self.terminals.len()]
        }
    }

    /// Uniformly random primitive of the given arity, if any
    pub fn random_with_arity(&self, arity: usize, rng: &mut dyn RngCore) -> Option<&Primitive> {
        let bucket = self.with_arity(arity);
        if bucket.is_empty() {
            None
        } else {
            Some(&bucket[rng.gen_range(0..bucket.len())])
        }
    }
}

fn dedup(primitives: Vec<Primitive>) -> Vec<Primitive> {
    let mut unique: Vec<Primitive> = Vec::with_capacity(primitives.len());
    for primitive in primitives {
        if !unique.contains(&primitive) {
            unique.push(primitive);
        }
    }
    unique
}

/// Builder for [`PrimitiveSet`]
#[derive(Clone, Debug, Default)]
pub struct PrimitiveSetBuilder {
    terminals: Vec<Primitive>,
    functions: Vec<Primitive>,
}

impl PrimitiveSetBuilder {
    /// Add a variable terminal
    pub fn variable(mut self, name: impl Into<String>, index: usize) -> Self {
        self.terminals.push(Primitive::variable(name, index));
        self
    }

    /// Add a constant terminal
    pub fn constant(mut self, value: f64) -> Self {
        self.terminals.push(Primitive::Constant(value));
        self
    }

    /// Add a terminal primitive
    pub fn terminal(mut self, primitive: Primitive) -> Self {
        self.terminals.push(primitive);
        self
    }

    /// Add a function primitive
    pub fn function(mut self, primitive: Primitive) -> Self {
        self.functions.push(primitive);
        self
    }

    /// Build the primitive set
    pub fn build(self) -> Result<PrimitiveSet, ProgramError> {
        PrimitiveSet::new(self.terminals, self.functions)
    }
}

#[derive(Serialize, Deserialize)]
struct PrimitiveSetRepr {
    terminals: Vec<Primitive>,
    functions: Vec<Primitive>,
}

impl From<PrimitiveSet> for PrimitiveSetRepr {
    fn from(set: PrimitiveSet) -> Self {
        Self {
            terminals: set.terminals,
            functions: set.functions,
        }
    }
}

impl TryFrom<PrimitiveSetRepr> for PrimitiveSet {
    type Error = ProgramError;

    fn try_from(repr: PrimitiveSetRepr) -> Result<Self, Self::Error> {
        PrimitiveSet::new(repr.terminals, repr.functions)
    }
}
