/*!
First-order rules.

A rule is either *weighted*, in which case violation of a grounding of the rule is penalised in proportion to the weight, or a *constraint*, in which case every grounding must be satisfied.

# Logical rules

A logical rule is a formula, e.g. `Friends(A, B) ∧ Smokes(A) → Smokes(B)`, interpreted with Łukasiewicz logic.
The rule is analysed by way of its negation, which must be a single conjunction of literals in disjunctive normal form.
So, the formula is (equivalent to) a disjunction of literals, and the *distance to satisfaction* of a grounding is a hinge on a linear function of the literals.

A formula is rejected if:
- The negation of the formula has more than one clause.
- Some variable does not occur in a positive literal (of the negation) over a standard predicate.
- The formula has no variables.

# Arithmetic rules

An arithmetic rule compares a weighted sum of atoms against a constant, e.g. `Label(A, 'x') + Label(A, 'y') = 1`.
Each distinct substitution of the atoms of the sum is a grounding.
*/

use crate::{
    structures::{
        atom::QueryAtom,
        comparator::Comparator,
        dnf::{DNFClause, FormulaAnalysis},
        formula::Formula,
        predicate::Registry,
    },
    types::err::RuleError,
};

/// The index of a rule in a context.
pub type RuleIndex = u32;

/// A sum of weighted atoms, compared against a constant.
#[derive(Clone, Debug, PartialEq)]
pub struct ArithmeticExpression {
    pub terms: Vec<(f64, QueryAtom)>,
    pub comparator: Comparator,
    pub constant: f64,
}

#[derive(Clone, Debug)]
pub enum RuleBody {
    Logical { formula: Formula, clause: DNFClause },
    Arithmetic(ArithmeticExpression),
}

#[derive(Clone, Debug)]
pub struct Rule {
    /// The weight of the rule, if weighted, else the rule is a constraint.
    pub weight: Option<f64>,

    /// Whether the penalty of a grounding is squared.
    pub squared: bool,

    pub body: RuleBody,

    query: Formula,
}

impl Rule {
    /// A logical rule.
    pub fn logical(
        registry: &Registry,
        formula: Formula,
        weight: Option<f64>,
        squared: bool,
    ) -> Result<Self, RuleError> {
        Rule::check_weight(weight)?;

        let analysis = FormulaAnalysis::new(&!formula.clone(), registry);
        if analysis.clause_count() != 1 {
            return Err(RuleError::NotDisjunctionOfLiterals);
        }

        let Some(clause) = analysis.into_clauses().pop() else {
            return Err(RuleError::NotDisjunctionOfLiterals);
        };

        if !clause.all_variables_bound() {
            let names = clause
                .unbound()
                .iter()
                .map(|variable| variable.name().to_string())
                .collect();
            return Err(RuleError::UnboundVariables(names));
        }

        if clause.is_ground() {
            return Err(RuleError::NoVariables);
        }

        let Some(query) = clause.query().cloned() else {
            return Err(RuleError::NotDisjunctionOfLiterals);
        };

        Ok(Rule {
            weight,
            squared,
            body: RuleBody::Logical { formula, clause },
            query,
        })
    }

    /// An arithmetic rule.
    pub fn arithmetic(
        registry: &Registry,
        expression: ArithmeticExpression,
        weight: Option<f64>,
        squared: bool,
    ) -> Result<Self, RuleError> {
        Rule::check_weight(weight)?;

        if expression.terms.is_empty() {
            return Err(RuleError::EmptyExpression);
        }

        let mut conjuncts: Vec<Formula> = Vec::default();
        for (coefficient, atom) in &expression.terms {
            if !coefficient.is_finite() {
                return Err(RuleError::InvalidWeight(*coefficient));
            }
            if !registry.get(atom.predicate).is_standard() {
                return Err(RuleError::FunctionalInArithmetic);
            }
            let conjunct = Formula::Atom(atom.clone());
            if !conjuncts.contains(&conjunct) {
                conjuncts.push(conjunct);
            }
        }

        let query = match conjuncts.len() {
            1 => conjuncts.remove(0),
            _ => Formula::Conjunction(conjuncts),
        };

        Ok(Rule {
            weight,
            squared,
            body: RuleBody::Arithmetic(expression),
            query,
        })
    }

    fn check_weight(weight: Option<f64>) -> Result<(), RuleError> {
        match weight {
            Some(w) if !w.is_finite() => Err(RuleError::InvalidWeight(w)),
            _ => Ok(()),
        }
    }

    /// Whether the rule is a constraint, i.e. has no weight.
    pub fn is_constraint(&self) -> bool {
        self.weight.is_none()
    }

    pub fn is_logical(&self) -> bool {
        matches!(self.body, RuleBody::Logical { .. })
    }

    /// The query whose results are the substitutions with which to ground the rule.
    pub fn query(&self) -> &Formula {
        &self.query
    }

    /// The clause of a logical rule.
    pub fn clause(&self) -> Option<&DNFClause> {
        match &self.body {
            RuleBody::Logical { clause, .. } => Some(clause),
            RuleBody::Arithmetic(_) => None,
        }
    }
}
