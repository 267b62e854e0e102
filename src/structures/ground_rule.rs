/*!
Ground rules, i.e. rules instantiated by some substitution.

Every ground rule is a linear function `Σ cᵢ·xᵢ + constant` over atoms, together with a [kind](GroundRuleKind):
- A weighted ground rule is penalised by `max(0, f)`, or its square.
- A constraint requires `f ⋈ 0`, for the comparator ⋈ of the constraint.

For a ground logical rule whose negation has positive literals P and negative literals N the function is `Σ_{P} x − Σ_{N} x + 1 − |P|`, the Łukasiewicz distance to satisfaction.
*/

use crate::{
    db::AtomIndex,
    generic::numeric,
    structures::{comparator::Comparator, rule::RuleIndex},
};

/// The kind of a ground rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GroundRuleKind {
    Weighted { weight: f64, squared: bool },
    Constraint(Comparator),
}

/// A ground rule.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundRule {
    /// The rule the ground rule is an instance of.
    pub rule: RuleIndex,

    pub kind: GroundRuleKind,

    /// Coefficient and atom pairs, in order of literals.
    pub literals: Vec<(f64, AtomIndex)>,

    pub constant: f64,

    /// Whether the ground rule is an instance of a logical rule.
    pub logical: bool,
}

/// The identity of a ground rule, for deduplication.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroundRuleIdentity {
    rule: RuleIndex,
    kind: (u8, u64, bool),
    literals: Vec<(u64, AtomIndex)>,
    constant: u64,
}

impl GroundRule {
    /// A ground logical rule, from the ground positive and negative literals of the negation of the rule.
    pub fn logical(
        rule: RuleIndex,
        kind: GroundRuleKind,
        positive: &[AtomIndex],
        negative: &[AtomIndex],
    ) -> Self {
        let literals = positive
            .iter()
            .map(|atom| (1.0, *atom))
            .chain(negative.iter().map(|atom| (-1.0, *atom)))
            .collect();

        GroundRule {
            rule,
            kind,
            literals,
            constant: 1.0 - positive.len() as f64,
            logical: true,
        }
    }

    /// A ground arithmetic rule, as the function `Σ cᵢ·xᵢ − bound`.
    pub fn arithmetic(
        rule: RuleIndex,
        kind: GroundRuleKind,
        literals: Vec<(f64, AtomIndex)>,
        bound: f64,
    ) -> Self {
        GroundRule {
            rule,
            kind,
            literals,
            constant: -bound,
            logical: false,
        }
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self.kind, GroundRuleKind::Constraint(_))
    }

    pub fn weight(&self) -> Option<f64> {
        match self.kind {
            GroundRuleKind::Weighted { weight, .. } => Some(weight),
            GroundRuleKind::Constraint(_) => None,
        }
    }

    /// The atoms of the ground rule, with repetition.
    pub fn atoms(&self) -> impl Iterator<Item = AtomIndex> + '_ {
        self.literals.iter().map(|(_, atom)| *atom)
    }

    /// The value of the function of the ground rule under the given values.
    pub fn function(&self, values: &[f32]) -> f64 {
        self.function_with(|atom| values[atom as usize] as f64)
    }

    /// The value of the function of the ground rule, with the value of each atom given by `value`.
    pub fn function_with(&self, value: impl Fn(AtomIndex) -> f64) -> f64 {
        self.literals
            .iter()
            .map(|(coefficient, atom)| coefficient * value(*atom))
            .sum::<f64>()
            + self.constant
    }

    /// The greatest value of the function, with each random variable free to take any value in [0, 1] and every other atom at its value.
    ///
    /// Coefficients of a repeated random variable are summed before the value is chosen.
    pub fn worst_case(&self, values: &[f32], is_random_variable: impl Fn(AtomIndex) -> bool) -> f64 {
        let mut merged: Vec<(AtomIndex, f64)> = Vec::with_capacity(self.literals.len());
        let mut worst = self.constant;

        for (coefficient, atom) in &self.literals {
            match is_random_variable(*atom) {
                true => match merged.iter_mut().find(|(a, _)| a == atom) {
                    Some((_, c)) => *c += coefficient,
                    None => merged.push((*atom, *coefficient)),
                },
                false => worst += coefficient * values[*atom as usize] as f64,
            }
        }

        worst + merged.iter().map(|(_, c)| c.max(0.0)).sum::<f64>()
    }

    /// Whether no atom of the ground rule is a random variable.
    pub fn is_constant(&self, is_random_variable: impl Fn(AtomIndex) -> bool) -> bool {
        !self.atoms().any(is_random_variable)
    }

    /// The penalty of a weighted ground rule, zero for a constraint.
    pub fn incompatibility(&self, values: &[f32]) -> f64 {
        self.penalty(self.function(values))
    }

    /// The penalty of a weighted ground rule with the given value of its function, zero for a constraint.
    pub fn penalty(&self, function: f64) -> f64 {
        match self.kind {
            GroundRuleKind::Weighted { squared, .. } => {
                let hinge = function.max(0.0);
                match squared {
                    true => hinge * hinge,
                    false => hinge,
                }
            }
            GroundRuleKind::Constraint(_) => 0.0,
        }
    }

    pub fn weighted_incompatibility(&self, values: &[f32]) -> f64 {
        match self.kind {
            GroundRuleKind::Weighted { weight, .. } => weight * self.incompatibility(values),
            GroundRuleKind::Constraint(_) => 0.0,
        }
    }

    /// How far a constraint is from satisfaction, zero for a weighted ground rule.
    pub fn infeasibility(&self, values: &[f32]) -> f64 {
        match self.kind {
            GroundRuleKind::Constraint(comparator) => comparator.violation(self.function(values)),
            GroundRuleKind::Weighted { .. } => 0.0,
        }
    }

    /// The truth value of a ground logical rule, one less the distance to satisfaction.
    pub fn truth_value(&self, values: &[f32]) -> f64 {
        1.0 - self.function(values).max(0.0)
    }

    /// Whether the ground rule is satisfied, to within the default tolerance.
    pub fn is_satisfied(&self, values: &[f32]) -> bool {
        match self.kind {
            GroundRuleKind::Weighted { .. } => self.function(values) <= numeric::EPSILON,
            GroundRuleKind::Constraint(_) => self.infeasibility(values) <= numeric::EPSILON,
        }
    }

    pub fn identity(&self) -> GroundRuleIdentity {
        let kind = match self.kind {
            GroundRuleKind::Weighted { weight, squared } => (0, weight.to_bits(), squared),
            GroundRuleKind::Constraint(comparator) => (
                match comparator {
                    Comparator::LessThanEqual => 1,
                    Comparator::GreaterThanEqual => 2,
                    Comparator::Equal => 3,
                },
                0,
                false,
            ),
        };

        GroundRuleIdentity {
            rule: self.rule,
            kind,
            literals: self
                .literals
                .iter()
                .map(|(coefficient, atom)| (coefficient.to_bits(), *atom))
                .collect(),
            constant: self.constant.to_bits(),
        }
    }
}
