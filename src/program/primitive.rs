//! Primitive kinds
//!
//! Every node of a program tree carries a [`Primitive`]. A primitive is plain
//! data: its arity, its label and its compute rule are all answered by a
//! `match` over the variant.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A terminal or function symbol usable as a tree node
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Primitive {
    // === Terminals (arity 0) ===
    /// Input variable, read from `variables[index]` at evaluation time
    Variable {
        /// Display name
        name: String,
        /// Position in the variable bindings
        index: usize,
    },
    /// Constant value
    Constant(f64),

    // === Binary functions ===
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Protected division (returns 1.0 for division by zero)
    Div,
    /// Protected power
    Pow,
    /// Minimum of two values
    Min,
    /// Maximum of two values
    Max,

    // === Unary functions ===
    /// Negation
    Neg,
    /// Absolute value
    Abs,
    /// Sine
    Sin,
    /// Cosine
    Cos,
    /// Exponential (overflow protected)
    Exp,
    /// Natural logarithm (protected)
    Log,
    /// Square root (protected)
    Sqrt,

    // === Conditional ===
    /// `if a > b { c } else { d }`
    IfGreater,
}

impl Primitive {
    /// Create a variable terminal
    pub fn variable(name: impl Into<String>, index: usize) -> Self {
        Self::Variable {
            name: name.into(),
            index,
        }
    }

    /// Create a constant terminal
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// Number of children a node of this primitive takes
    pub fn arity(&self) -> usize {
        match self {
            Self::Variable { .. } | Self::Constant(_) => 0,
            Self::Neg | Self::Abs | Self::Sin | Self::Cos | Self::Exp | Self::Log | Self::Sqrt => 1,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Pow | Self::Min | Self::Max => 2,
            Self::IfGreater => 4,
        }
    }

    /// Check if this is a terminal (arity 0)
    pub fn is_terminal(&self) -> bool {
        self.arity() == 0
    }

    /// Check if this is a function (arity >= 1)
    pub fn is_function(&self) -> bool {
        !self.is_terminal()
    }

    /// Symbol identity of this primitive
    pub fn label(&self) -> String {
        match self {
            Self::Variable { name, .. } => name.clone(),
            Self::Constant(c) => format!("{}", c),
            other => other.symbol().to_string(),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Self::Variable { .. } | Self::Constant(_) => "",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::Min => "min",
            Self::Max => "max",
            Self::Neg => "neg",
            Self::Abs => "abs",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Sqrt => "sqrt",
            Self::IfGreater => "ifgt",
        }
    }

    /// Whether the expression renderer writes this function between its operands
    pub(crate) fn is_infix(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Pow
        )
    }

    /// Apply the compute rule
    ///
    /// `args` holds the already-computed children values; terminals ignore it
    /// and read from `variables` instead.
    pub fn compute(&self, args: &[f64], variables: &[f64]) -> f64 {
        let arg = |i: usize, default: f64| args.get(i).copied().unwrap_or(default);
        match self {
            Self::Variable { index, .. } => variables.get(*index).copied().unwrap_or(0.0),
            Self::Constant(c) => *c,
            Self::Add => arg(0, 0.0) + arg(1, 0.0),
            Self::Sub => arg(0, 0.0) - arg(1, 0.0),
            Self::Mul => arg(0, 1.0) * arg(1, 1.0),
            Self::Div => {
                let b = arg(1, 1.0);
                if b.abs() < 1e-10 {
                    1.0
                } else {
                    arg(0, 0.0) / b
                }
            }
            Self::Pow => {
                let base = arg(0, 1.0);
                let exp = arg(1, 1.0);
                if base.abs() < 1e-10 && exp < 0.0 {
                    0.0
                } else {
                    base.powf(exp).clamp(-1e10, 1e10)
                }
            }
            Self::Min => arg(0, 0.0).min(arg(1, 0.0)),
            Self::Max => arg(0, 0.0).max(arg(1, 0.0)),
            Self::Neg => -arg(0, 0.0),
            Self::Abs => arg(0, 0.0).abs(),
            Self::Sin => arg(0, 0.0).sin(),
            Self::Cos => arg(0, 0.0).cos(),
            Self::Exp => {
                let x = arg(0, 0.0);
                if x > 700.0 {
                    f64::MAX
                } else {
                    x.exp()
                }
            }
            Self::Log => {
                let x = arg(0, 1.0);
                if x <= 0.0 {
                    0.0
                } else {
                    x.ln()
                }
            }
            Self::Sqrt => arg(0, 0.0).abs().sqrt(),
            Self::IfGreater => {
                if arg(0, 0.0) > arg(1, 0.0) {
                    arg(2, 0.0)
                } else {
                    arg(3, 0.0)
                }
            }
        }
    }
}

// Constants compare by bit pattern so that equality is reflexive (NaN == NaN)
// and agrees with `Hash`.
impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Variable { name, index },
                Self::Variable {
                    name: other_name,
                    index: other_index,
                },
            ) => name == other_name && index == other_index,
            (Self::Constant(a), Self::Constant(b)) => a.to_bits() == b.to_bits(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Eq for Primitive {}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Variable { name, index } => {
                name.hash(state);
                index.hash(state);
            }
            Self::Constant(c) => c.to_bits().hash(state),
            _ => {}
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity() {
        assert_eq!(Primitive::variable("x", 0).arity(), 0);
        assert_eq!(Primitive::constant(1.0).arity(), 0);
        assert_eq!(Primitive::Add.arity(), 2);
        assert_eq!(Primitive::Sin.arity(), 1);
        assert_eq!(Primitive::IfGreater.arity(), 4);
        assert!(Primitive::constant(0.0).is_terminal());
        assert!(Primitive::Mul.is_function());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Primitive::variable("x", 0).label(), "x");
        assert_eq!(Primitive::constant(1.0).label(), "1");
        assert_eq!(Primitive::constant(2.5).label(), "2.5");
        assert_eq!(Primitive::Add.label(), "+");
        assert_eq!(Primitive::Sqrt.to_string(), "sqrt");
    }

    #[test]
    fn test_protected_div() {
        assert_eq!(Primitive::Div.compute(&[1.0, 0.0], &[]), 1.0);
        assert_eq!(Primitive::Div.compute(&[6.0, 2.0], &[]), 3.0);
    }

    #[test]
    fn test_protected_log() {
        assert_eq!(Primitive::Log.compute(&[-1.0], &[]), 0.0);
        assert!((Primitive::Log.compute(&[std::f64::consts::E], &[]) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_protected_sqrt() {
        assert_eq!(Primitive::Sqrt.compute(&[4.0], &[]), 2.0);
        assert_eq!(Primitive::Sqrt.compute(&[-4.0], &[]), 2.0);
    }

    #[test]
    fn test_if_greater() {
        assert_eq!(Primitive::IfGreater.compute(&[2.0, 1.0, 10.0, 20.0], &[]), 10.0);
        assert_eq!(Primitive::IfGreater.compute(&[1.0, 1.0, 10.0, 20.0], &[]), 20.0);
    }

    #[test]
    fn test_variable_reads_bindings() {
        let y = Primitive::variable("y", 1);
        assert_eq!(y.compute(&[], &[3.0, 4.0]), 4.0);
        assert_eq!(y.compute(&[], &[3.0]), 0.0);
    }

    #[test]
    fn test_constant_equality_is_reflexive() {
        let nan = Primitive::constant(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(Primitive::constant(1.0), Primitive::constant(2.0));
        assert_ne!(Primitive::Add, Primitive::Sub);
        assert_eq!(Primitive::Add, Primitive::Add);
    }
}
