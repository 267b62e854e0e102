/*!
The numeric form of ground rules, as optimised by a reasoner.

Each [Term] is a hyperplane `c·x` over random variable atoms, compared with a constant `b`:
- [Linear](TermKind::Linear) terms contribute `w(c·x − b)`.
- [Hinge](TermKind::Hinge) terms contribute `w·max(0, c·x − b)`.
- [SquaredHinge](TermKind::SquaredHinge) terms contribute `w·max(0, c·x − b)²`.
- [Constraint](TermKind::Constraint) terms contribute nothing, and require `c·x − b ⋈ 0`.

Atoms of a term are positions in the shared array of atom values, each distinct within a term.
Terms are built from ground rules by [generate_terms](crate::procedures::terms).
*/

use crate::{
    db::{AtomIndex, GroundRuleKey},
    structures::comparator::Comparator,
};

/// The kind of a term.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermKind {
    Linear,
    Hinge,
    SquaredHinge,
    Constraint(Comparator),
}

/// A term.
#[derive(Clone, Debug)]
pub struct Term {
    pub kind: TermKind,

    /// The weight of the term, zero for a constraint.
    pub weight: f32,

    pub coefficients: Vec<f32>,

    pub atoms: Vec<AtomIndex>,

    pub constant: f32,

    /// The ground rule from which the term was built.
    pub ground_rule: GroundRuleKey,
}

impl Term {
    pub fn size(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self.kind, TermKind::Constraint(_))
    }

    /// `c·x`, for the given values.
    pub fn dot(&self, values: &[f32]) -> f32 {
        self.coefficients
            .iter()
            .zip(&self.atoms)
            .map(|(coefficient, atom)| coefficient * values[*atom as usize])
            .sum()
    }

    /// `c·x − b`, for the given values.
    pub fn linear_value(&self, values: &[f32]) -> f32 {
        self.dot(values) - self.constant
    }

    /// The weighted loss of the term, zero for a constraint.
    pub fn loss(&self, values: &[f32]) -> f64 {
        let value = self.linear_value(values) as f64;
        let weight = self.weight as f64;
        match self.kind {
            TermKind::Linear => weight * value,
            TermKind::Hinge => weight * value.max(0.0),
            TermKind::SquaredHinge => weight * value.max(0.0).powi(2),
            TermKind::Constraint(_) => 0.0,
        }
    }

    /// The violation of a constraint, zero for any other term.
    pub fn violation(&self, values: &[f32]) -> f64 {
        match self.kind {
            TermKind::Constraint(comparator) => {
                comparator.violation(self.linear_value(values) as f64)
            }
            _ => 0.0,
        }
    }
}

/// The term database.
#[derive(Clone, Debug, Default)]
pub struct TermDB {
    terms: Vec<Term>,

    /// The distinct atoms of the terms, in order.
    variables: Vec<AtomIndex>,
}

impl TermDB {
    pub fn new(terms: Vec<Term>) -> Self {
        let mut variables = terms
            .iter()
            .flat_map(|term| term.atoms.iter().copied())
            .collect::<Vec<_>>();
        variables.sort_unstable();
        variables.dedup();

        TermDB { terms, variables }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// The distinct atoms of the terms, in order.
    pub fn variables(&self) -> &[AtomIndex] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    /// The sum of the loss of each term.
    pub fn objective(&self, values: &[f32]) -> f64 {
        self.terms.iter().map(|term| term.loss(values)).sum()
    }

    /// A count of constraints violated by more than `tolerance`.
    pub fn violated_constraints(&self, values: &[f32], tolerance: f64) -> usize {
        self.terms
            .iter()
            .filter(|term| term.violation(values) > tolerance)
            .count()
    }
}
