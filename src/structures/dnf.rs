/*!
Analysis of the clauses of a formula in disjunctive normal form.

A [DNFClause] is a conjunction of literals, and records:
- The positive and negative literals of the clause.
- Which positive literals over standard predicates depend on which predicates, for use when an atom of some predicate is activated.
- The *unbound* variables, which do not occur in any positive literal over a standard predicate.
  As queries range over stored atoms only, there is no way to find a substitution for an unbound variable.
- Whether the clause is ground.

When every variable is bound, the clause has a query.
The query is the conjunction of the positive literals, together with any negative literals over grounding-only predicates (which filter, rather than bind).
*/

use std::collections::{BTreeMap, BTreeSet};

use crate::structures::{
    atom::{QueryAtom, Substitution},
    constant::{Constant, Variable},
    formula::{Formula, Literal},
    predicate::{PredicateId, Registry},
};

/// A conjunction of literals, analysed.
#[derive(Clone, Debug)]
pub struct DNFClause {
    positive: Vec<QueryAtom>,
    negative: Vec<QueryAtom>,

    /// Predicate to the index of each positive literal over the predicate.
    dependence: BTreeMap<PredicateId, Vec<usize>>,

    unbound: BTreeSet<Variable>,
    ground: bool,
    query: Option<Formula>,
}

impl DNFClause {
    pub fn new(literals: Vec<Literal>, registry: &Registry) -> Self {
        let mut positive = Vec::default();
        let mut negative = Vec::default();
        for literal in literals {
            match literal.polarity {
                true => positive.push(literal.atom),
                false => negative.push(literal.atom),
            }
        }

        let mut dependence: BTreeMap<PredicateId, Vec<usize>> = BTreeMap::default();
        let mut bound = BTreeSet::default();
        for (index, atom) in positive.iter().enumerate() {
            if registry.get(atom.predicate).is_standard() {
                dependence.entry(atom.predicate).or_default().push(index);
                bound.extend(atom.variables().cloned());
            }
        }

        let all = positive
            .iter()
            .chain(negative.iter())
            .flat_map(|atom| atom.variables().cloned())
            .collect::<BTreeSet<_>>();

        let unbound = all.difference(&bound).cloned().collect::<BTreeSet<_>>();

        let query = match unbound.is_empty() && !positive.is_empty() {
            false => None,
            true => {
                let mut conjuncts = positive
                    .iter()
                    .cloned()
                    .map(Formula::Atom)
                    .collect::<Vec<_>>();

                for atom in &negative {
                    if !registry.get(atom.predicate).is_standard() {
                        conjuncts.push(!Formula::Atom(atom.clone()));
                    }
                }

                match conjuncts.len() {
                    1 => conjuncts.pop(),
                    _ => Some(Formula::Conjunction(conjuncts)),
                }
            }
        };

        DNFClause {
            positive,
            negative,
            dependence,
            unbound,
            ground: all.is_empty(),
            query,
        }
    }

    pub fn positive(&self) -> &[QueryAtom] {
        &self.positive
    }

    pub fn negative(&self) -> &[QueryAtom] {
        &self.negative
    }

    pub fn dependence(&self) -> &BTreeMap<PredicateId, Vec<usize>> {
        &self.dependence
    }

    pub fn depends_on(&self, predicate: PredicateId) -> bool {
        self.dependence.contains_key(&predicate)
    }

    pub fn unbound(&self) -> &BTreeSet<Variable> {
        &self.unbound
    }

    pub fn is_ground(&self) -> bool {
        self.ground
    }

    pub fn all_variables_bound(&self) -> bool {
        self.unbound.is_empty()
    }

    pub fn query(&self) -> Option<&Formula> {
        self.query.as_ref()
    }

    /// The literals of the clause, positive then negative.
    pub fn literals(&self) -> impl Iterator<Item = (&QueryAtom, bool)> {
        self.positive
            .iter()
            .map(|atom| (atom, true))
            .chain(self.negative.iter().map(|atom| (atom, false)))
    }

    /// Each substitution under which some positive literal of the clause over `predicate` grounds to the given arguments.
    pub fn trace_atom_event(&self, predicate: PredicateId, arguments: &[Constant]) -> Vec<Substitution> {
        let mut substitutions: Vec<Substitution> = Vec::default();

        if let Some(indices) = self.dependence.get(&predicate) {
            for index in indices {
                if let Some(substitution) = self.positive[*index].trace(arguments) {
                    if !substitutions.contains(&substitution) {
                        substitutions.push(substitution);
                    }
                }
            }
        }

        substitutions
    }
}

/// The clauses of the disjunctive normal form of a formula.
#[derive(Clone, Debug)]
pub struct FormulaAnalysis {
    clauses: Vec<DNFClause>,
}

impl FormulaAnalysis {
    pub fn new(formula: &Formula, registry: &Registry) -> Self {
        FormulaAnalysis {
            clauses: formula
                .dnf_clauses()
                .into_iter()
                .map(|literals| DNFClause::new(literals, registry))
                .collect(),
        }
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[DNFClause] {
        &self.clauses
    }

    pub fn into_clauses(self) -> Vec<DNFClause> {
        self.clauses
    }
}
