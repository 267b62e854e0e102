//! Error types used in the library.
//!
//! - Most errors are raised while a model is being built, e.g. a rule whose formula cannot be turned into a query.
//! - Some errors are raised during grounding, and these indicate some internal inconsistency --- e.g. a variable which survives substitution.
//! - Reasoners rarely error, as failing to converge is a normal outcome reported through a [Report](crate::reports::Report).
//!
//! Names of the error enums --- for the most part --- overlap with corresponding structs.
//  As such, throughout the library err::{self} is often used to prefix use of the types with `err::`.

#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    Registry(RegistryError),
    Rule(RuleError),
    AtomDB(AtomDBError),
    Query(QueryError),
    Grounding(GroundingError),
    GroundRuleDB(GroundRuleDBError),
    Reasoner(ReasonerError),
    Config(ConfigError),

    InvalidState,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rule(e) => write!(f, "{e}"),
            Self::InvalidState => write!(f, "Invalid state"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl std::error::Error for ErrorKind {}

/// Errors when registering predicates or constructing atoms over registered predicates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A predicate must take at least one argument.
    EmptyArguments,

    /// Names are non-empty, and the prefix '#' is reserved for grounding-only predicates.
    InvalidName,

    /// A predicate of the same name was registered with a different signature.
    NameConflict(String),

    /// No predicate is registered with the name.
    UnknownPredicate(String),

    /// The number of arguments given differs from the arity of the predicate.
    ArityMismatch {
        predicate: String,
        expected: usize,
        found: usize,
    },

    /// A constant was given at a position which expects a different type of constant.
    TypeMismatch { predicate: String, position: usize },
}

impl From<RegistryError> for ErrorKind {
    fn from(e: RegistryError) -> Self {
        ErrorKind::Registry(e)
    }
}

/// Errors when constructing a rule.
#[derive(Clone, Debug, PartialEq)]
pub enum RuleError {
    /// The negation of the formula has more than one clause in disjunctive normal form.
    NotDisjunctionOfLiterals,

    /// Some variables do not occur in any positive literal over a standard predicate, and so cannot be bound by a query.
    UnboundVariables(Vec<String>),

    /// The formula has no variables.
    NoVariables,

    /// A weight must be finite.
    InvalidWeight(f64),

    /// An arithmetic expression must have some atom.
    EmptyExpression,

    /// Arithmetic expressions are over standard predicates only.
    FunctionalInArithmetic,
}

impl std::fmt::Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDisjunctionOfLiterals => write!(
                f,
                "Formula must be a disjunction of literals (or a negative literal)."
            ),
            Self::UnboundVariables(variables) => write!(
                f,
                "Any variable used in a negated (non-functional) predicate must also participate in a positive (non-functional) predicate. The following variables do not meet this requirement: [{}].",
                variables.join(", ")
            ),
            Self::NoVariables => write!(f, "Formula has no variables."),
            Self::InvalidWeight(w) => write!(f, "Invalid weight: {w}."),
            Self::EmptyExpression => write!(f, "Arithmetic expression has no atoms."),
            Self::FunctionalInArithmetic => {
                write!(f, "Arithmetic expressions may not use grounding-only predicates.")
            }
        }
    }
}

impl From<RuleError> for ErrorKind {
    fn from(e: RuleError) -> Self {
        ErrorKind::Rule(e)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtomDBError {
    /// Random variable atoms may only be over open predicates.
    ClosedPredicateTarget,

    /// Atoms of grounding-only predicates are computed, not stored.
    FunctionalPredicate,

    /// An atom was added as both observed and as a random variable.
    StatusConflict,

    /// Values are within [0, 1].
    ValueOutOfRange,

    /// An attempt to change the value of an observed atom.
    FixedAtom,
}

impl From<AtomDBError> for ErrorKind {
    fn from(e: AtomDBError) -> Self {
        ErrorKind::AtomDB(e)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// Queries are conjunctions of atoms, with negation permitted only on grounding-only predicates.
    UnsupportedFormula,

    /// A grounding-only atom has a variable which no standard atom of the query binds.
    UnboundFunctional,
}

impl From<QueryError> for ErrorKind {
    fn from(e: QueryError) -> Self {
        ErrorKind::Query(e)
    }
}

/// Errors during grounding.
///
/// These are not expected, as rules are checked on construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroundingError {
    /// A variable without a substitution.
    UnboundVariable(String),

    /// Grounding-only predicates are binary.
    BuiltinArity,

    /// Grounding-only predicates compare constants of the same type.
    BuiltinTypeMismatch,
}

impl From<GroundingError> for ErrorKind {
    fn from(e: GroundingError) -> Self {
        ErrorKind::Grounding(e)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundRuleDBError {
    /// No ground rule is stored with the key.
    MissingKey,
}

impl From<GroundRuleDBError> for ErrorKind {
    fn from(e: GroundRuleDBError) -> Self {
        ErrorKind::GroundRuleDB(e)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReasonerError {
    /// A boolean reasoner supports only constraints which define blocks of mutually exclusive atoms.
    UnsupportedConstraint,

    /// Some atom is in more than one block.
    OverlappingBlocks,
}

impl From<ReasonerError> for ErrorKind {
    fn from(e: ReasonerError) -> Self {
        ErrorKind::Reasoner(e)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The value of the named option is outside its bounds.
    OutOfRange(&'static str),

    /// The named option cannot be changed in the current state of the context.
    Locked(&'static str),
}

impl From<ConfigError> for ErrorKind {
    fn from(e: ConfigError) -> Self {
        ErrorKind::Config(e)
    }
}
