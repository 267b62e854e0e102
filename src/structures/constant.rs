//! Constants, variables, and the arguments of atoms.
//!
//! Constants are cheap to clone, as text is shared.

use std::sync::Arc;

/// The type of a constant, as required at some position of a predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstantType {
    Integer,

    Text,

    /// Any constant, with the type checked when the predicate is evaluated.
    /// Used by grounding-only predicates.
    Deferred,
}

impl ConstantType {
    /// Whether a constant may be given where `self` is required.
    pub fn admits(&self, constant: &Constant) -> bool {
        matches!(
            (self, constant),
            (Self::Deferred, _) | (Self::Integer, Constant::Integer(_)) | (Self::Text, Constant::Text(_))
        )
    }
}

/// A constant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Integer(i64),
    Text(Arc<str>),
}

impl Constant {
    pub fn constant_type(&self) -> ConstantType {
        match self {
            Self::Integer(_) => ConstantType::Integer,
            Self::Text(_) => ConstantType::Text,
        }
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Integer(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::Text(Arc::from(value))
    }
}

impl From<String> for Constant {
    fn from(value: String) -> Self {
        Constant::Text(Arc::from(value))
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(t) => write!(f, "'{t}'"),
        }
    }
}

/// A (logical) variable, identified by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(Arc<str>);

impl Variable {
    pub fn new(name: &str) -> Self {
        Variable(Arc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The argument of an atom in a formula.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Argument {
    Variable(Variable),
    Constant(Constant),
}

impl Argument {
    /// A variable argument, with the given name.
    pub fn var(name: &str) -> Self {
        Argument::Variable(Variable::new(name))
    }

    /// A constant argument.
    pub fn constant(constant: impl Into<Constant>) -> Self {
        Argument::Constant(constant.into())
    }
}

impl From<Variable> for Argument {
    fn from(value: Variable) -> Self {
        Argument::Variable(value)
    }
}

impl From<Constant> for Argument {
    fn from(value: Constant) -> Self {
        Argument::Constant(value)
    }
}

impl std::fmt::Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variable(v) => write!(f, "{v}"),
            Self::Constant(c) => write!(f, "{c}"),
        }
    }
}
