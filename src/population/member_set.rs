//! Insertion-ordered set of distinct programs

use std::collections::HashSet;

use crate::program::Program;

/// Distinct programs kept in the order they were first inserted
///
/// Membership uses structural equality, so two separately built but
/// identical trees count once.
#[derive(Clone, Debug, Default)]
pub struct ProgramSet {
    members: Vec<Program>,
    index: HashSet<Program>,
}

impl ProgramSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for `capacity` programs
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
            index: HashSet::with_capacity(capacity),
        }
    }

    /// Insert a program, returning false if an equal one is already present
    pub fn insert(&mut self, program: Program) -> bool {
        if !self.index.insert(program.clone()) {
            return false;
        }
        self.members.push(program);
        true
    }

    /// Check membership
    pub fn contains(&self, program: &Program) -> bool {
        self.index.contains(program)
    }

    /// Number of programs
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Programs in insertion order
    pub fn as_slice(&self) -> &[Program] {
        &self.members
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Program> {
        self.members.iter()
    }
}

impl FromIterator<Program> for ProgramSet {
    fn from_iter<I: IntoIterator<Item = Program>>(iter: I) -> Self {
        let mut set = ProgramSet::new();
        for program in iter {
            set.insert(program);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ProgramSet {
    type Item = &'a Program;
    type IntoIter = std::slice::Iter<'a, Program>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
