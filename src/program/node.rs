//! Immutable program trees
//!
//! A [`Program`] is a reference-counted, immutable node. Edits such as
//! [`Program::replace`] build new nodes along the path to the edited position
//! and share every untouched subtree with the original.
//!
//! Sub-programs are addressed by their pre-order index: the node itself is 0,
//! followed by each child's subtree in child order.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ProgramError;
use crate::program::primitive::Primitive;

#[derive(Debug)]
struct Node {
    primitive: Primitive,
    children: Vec<Program>,
    length: usize,
    depth: usize,
    hash: u64,
}

/// A node in a program tree, together with its whole subtree
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "ProgramRepr", into = "ProgramRepr")]
pub struct Program(Arc<Node>);

impl Program {
    /// Create a node, checking that `children` matches the primitive's arity
    pub fn new(primitive: Primitive, children: Vec<Program>) -> Result<Self, ProgramError> {
        if children.len() != primitive.arity() {
            return Err(ProgramError::ArityMismatch {
                label: primitive.label(),
                expected: primitive.arity(),
                actual: children.len(),
            });
        }
        Ok(Self::from_parts(primitive, children))
    }

    /// Create a leaf node from a terminal primitive
    pub fn leaf(primitive: Primitive) -> Result<Self, ProgramError> {
        Self::new(primitive, Vec::new())
    }

    /// Create a variable leaf
    pub fn variable(name: impl Into<String>, index: usize) -> Self {
        Self::from_parts(Primitive::variable(name, index), Vec::new())
    }

    /// Create a constant leaf
    pub fn constant(value: f64) -> Self {
        Self::from_parts(Primitive::Constant(value), Vec::new())
    }

    // Callers guarantee `children.len() == primitive.arity()`.
    fn from_parts(primitive: Primitive, children: Vec<Program>) -> Self {
        debug_assert_eq!(children.len(), primitive.arity());
        let length = 1 + children.iter().map(Program::length).sum::<usize>();
        let depth = children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0);
        let mut hasher = DefaultHasher::new();
        primitive.hash(&mut hasher);
        for child in &children {
            hasher.write_u64(child.0.hash);
        }
        Self(Arc::new(Node {
            primitive,
            children,
            length,
            depth,
            hash: hasher.finish(),
        }))
    }

    /// Rebuild this node's primitive around new children
    ///
    /// Terminals ignore `children` and return themselves. Functions fail with
    /// [`ProgramError::ArityMismatch`] when the child count is wrong.
    pub fn create_new(&self, children: Vec<Program>) -> Result<Self, ProgramError> {
        if self.primitive().is_terminal() {
            return Ok(self.clone());
        }
        Self::new(self.primitive().clone(), children)
    }

    /// The primitive at this node
    pub fn primitive(&self) -> &Primitive {
        &self.0.primitive
    }

    /// Symbol identity of this node
    pub fn label(&self) -> String {
        self.0.primitive.label()
    }

    /// Number of children this node takes
    pub fn arity(&self) -> usize {
        self.0.primitive.arity()
    }

    /// Ordered children of this node
    pub fn children(&self) -> &[Program] {
        &self.0.children
    }

    /// Check if this node has no children
    pub fn is_leaf(&self) -> bool {
        self.0.children.is_empty()
    }

    /// Number of nodes in this subtree
    pub fn length(&self) -> usize {
        self.0.length
    }

    /// Edges on the longest path from this node to a leaf (a leaf has depth 0)
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    /// Get the sub-program at a pre-order index
    pub fn program_at(&self, index: usize) -> Result<&Program, ProgramError> {
        if index >= self.length() {
            return Err(ProgramError::IndexOutOfRange {
                index,
                length: self.length(),
            });
        }

        let mut node = self;
        let mut remaining = index;
        'descend: while remaining > 0 {
            remaining -= 1;
            for child in node.children() {
                if remaining < child.length() {
                    node = child;
                    continue 'descend;
                }
                remaining -= child.length();
            }
        }
        Ok(node)
    }

    /// Return a copy of this tree with the sub-program at `index` substituted
    ///
    /// Index 0 returns `new_program` itself. The receiver is left unchanged and
    /// subtrees off the edited path are shared.
    pub fn replace(&self, index: usize, new_program: Program) -> Result<Program, ProgramError> {
        if index >= self.length() {
            return Err(ProgramError::IndexOutOfRange {
                index,
                length: self.length(),
            });
        }
        if index == 0 {
            return Ok(new_program);
        }

        let mut offset = index - 1;
        for (i, child) in self.children().iter().enumerate() {
            if offset < child.length() {
                let mut children = self.children().to_vec();
                children[i] = child.replace(offset, new_program)?;
                return Ok(Self::from_parts(self.primitive().clone(), children));
            }
            offset -= child.length();
        }

        Err(ProgramError::IndexOutOfRange {
            index,
            length: self.length(),
        })
    }

    /// Pre-order iterator over this node and all of its descendants
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// All proper descendants in pre-order (excludes self)
    pub fn sub_programs(&self) -> impl Iterator<Item = &Program> + '_ {
        self.iter().skip(1)
    }

    /// Pre-order indexes of every node that has at least one child
    pub fn function_indexes(&self) -> Vec<usize> {
        self.iter()
            .enumerate()
            .filter(|(_, p)| !p.is_leaf())
            .map(|(i, _)| i)
            .collect()
    }

    /// Map this tree's indexes to `other`'s over their common region
    ///
    /// Both trees are walked in lockstep pre-order. A pair is kept only when
    /// both nodes have the same arity, and the walk continues into a pair's
    /// children only in that case. A mismatch drops that branch without
    /// affecting its siblings.
    pub fn common_region_indexes(&self, other: &Program) -> BTreeMap<usize, usize> {
        let mut region = BTreeMap::new();
        collect_common_region(self, 0, other, 0, &mut region);
        region
    }

    /// Human-readable rendering of this tree
    pub fn expression(&self) -> String {
        let primitive = self.primitive();
        if self.is_leaf() {
            return primitive.label();
        }

        let args: Vec<String> = self.children().iter().map(Program::expression).collect();
        if primitive.is_infix() {
            let separator = format!(" {} ", primitive.label());
            format!("({})", args.join(separator.as_str()))
        } else {
            format!("{}({})", primitive.label(), args.join(", "))
        }
    }

    /// Evaluate the tree with the given variable bindings
    pub fn evaluate(&self, variables: &[f64]) -> f64 {
        let args: Vec<f64> = self
            .children()
            .iter()
            .map(|c| c.evaluate(variables))
            .collect();
        self.primitive().compute(&args, variables)
    }
}

fn collect_common_region(
    a: &Program,
    index_a: usize,
    b: &Program,
    index_b: usize,
    region: &mut BTreeMap<usize, usize>,
) {
    if a.arity() != b.arity() {
        return;
    }
    region.insert(index_a, index_b);

    let mut child_a = index_a + 1;
    let mut child_b = index_b + 1;
    for (ca, cb) in a.children().iter().zip(b.children()) {
        collect_common_region(ca, child_a, cb, child_b, region);
        child_a += ca.length();
        child_b += cb.length();
    }
}

/// Pre-order traversal of a program tree
#[derive(Debug)]
pub struct PreOrder<'a> {
    stack: Vec<&'a Program>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Program;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Program;
    type IntoIter = PreOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.hash == other.0.hash
                && self.0.length == other.0.length
                && self.0.primitive == other.0.primitive
                && self.0.children == other.0.children)
    }
}

impl Eq for Program {}

impl Hash for Program {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Program({})", self.expression())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression())
    }
}

/// Serialized shape of a program node
#[derive(Serialize, Deserialize)]
struct ProgramRepr {
    primitive: Primitive,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Program>,
}

impl From<Program> for ProgramRepr {
    fn from(program: Program) -> Self {
        Self {
            primitive: program.primitive().clone(),
            children: program.children().to_vec(),
        }
    }
}

impl TryFrom<ProgramRepr> for Program {
    type Error = ProgramError;

    fn try_from(repr: ProgramRepr) -> Result<Self, Self::Error> {
        Program::new(repr.primitive, repr.children)
    }
}
