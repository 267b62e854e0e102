/*!
Formulas, and disjunctive normal form.

A [Formula] is a tree of [atoms](QueryAtom) joined by negation, conjunction, disjunction, and implication.

# Normal form

[dnf](Formula::dnf) returns an equivalent formula which is either:
- A single literal.
- A conjunction of literals.
- A disjunction, each child of which is a literal or a conjunction of literals.

The formula is rewritten by:
1. Replacing each implication `B → H` with `¬B ∨ H`.
2. Pushing negation to atoms, by De Morgan's laws (and removing double negation).
3. Distributing conjunction over disjunction.

These steps are interleaved, as [dnf_clauses](Formula::dnf_clauses) builds the clauses of a formula from the clauses of its children, carrying whether the formula is negated.

```rust
# use otter_psl::structures::{atom::QueryAtom, constant::Argument, formula::Formula};
let p: Formula = QueryAtom { predicate: 3, arguments: vec![Argument::var("A")] }.into();
let q: Formula = QueryAtom { predicate: 4, arguments: vec![Argument::var("A")] }.into();

// ¬(p → q) is p ∧ ¬q
let negated = !Formula::implies(p.clone(), q.clone());
assert_eq!(negated.dnf(), Formula::and(vec![p.clone(), !q.clone()]));
assert_eq!(negated.dnf_clauses().len(), 1);
```
*/

use crate::structures::{atom::QueryAtom, constant::Variable};

/// A formula over atoms.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Formula {
    Atom(QueryAtom),
    Negation(Box<Formula>),
    Conjunction(Vec<Formula>),
    Disjunction(Vec<Formula>),

    /// Body, then head.
    Implication(Box<Formula>, Box<Formula>),
}

/// An atom, together with a polarity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    pub atom: QueryAtom,
    pub polarity: bool,
}

impl Literal {
    pub fn new(atom: QueryAtom, polarity: bool) -> Self {
        Literal { atom, polarity }
    }

    pub fn negate(&self) -> Self {
        Literal {
            atom: self.atom.clone(),
            polarity: !self.polarity,
        }
    }
}

impl From<Literal> for Formula {
    fn from(literal: Literal) -> Self {
        match literal.polarity {
            true => Formula::Atom(literal.atom),
            false => Formula::Negation(Box::new(Formula::Atom(literal.atom))),
        }
    }
}

impl From<QueryAtom> for Formula {
    fn from(atom: QueryAtom) -> Self {
        Formula::Atom(atom)
    }
}

impl std::ops::Not for Formula {
    type Output = Formula;

    fn not(self) -> Self::Output {
        Formula::Negation(Box::new(self))
    }
}

impl Formula {
    pub fn and(children: Vec<Formula>) -> Self {
        Formula::Conjunction(children)
    }

    pub fn or(children: Vec<Formula>) -> Self {
        Formula::Disjunction(children)
    }

    pub fn implies(body: Formula, head: Formula) -> Self {
        Formula::Implication(Box::new(body), Box::new(head))
    }

    pub fn negation(formula: Formula) -> Self {
        !formula
    }

    /// Whether the formula is an atom, or a negated atom.
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Atom(_) => true,
            Self::Negation(inner) => matches!(**inner, Self::Atom(_)),
            _ => false,
        }
    }

    /// Whether the formula is a literal, a conjunction of literals, or a disjunction of either.
    pub fn is_dnf(&self) -> bool {
        let is_conjunct = |formula: &Formula| match formula {
            Self::Conjunction(children) => children.iter().all(|child| child.is_literal()),
            other => other.is_literal(),
        };

        match self {
            Self::Disjunction(children) => children.iter().all(is_conjunct),
            other => is_conjunct(other),
        }
    }

    /// The distinct atoms of the formula, in order of first occurrence.
    pub fn atoms(&self) -> Vec<&QueryAtom> {
        let mut atoms = Vec::default();
        self.collect_atoms(&mut atoms);
        atoms
    }

    fn collect_atoms<'a>(&'a self, atoms: &mut Vec<&'a QueryAtom>) {
        match self {
            Self::Atom(atom) => {
                if !atoms.contains(&atom) {
                    atoms.push(atom)
                }
            }
            Self::Negation(inner) => inner.collect_atoms(atoms),
            Self::Conjunction(children) | Self::Disjunction(children) => {
                children.iter().for_each(|child| child.collect_atoms(atoms))
            }
            Self::Implication(body, head) => {
                body.collect_atoms(atoms);
                head.collect_atoms(atoms);
            }
        }
    }

    /// The distinct variables of the formula, in order of first occurrence.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut variables = Vec::default();
        for atom in self.atoms() {
            for variable in atom.variables() {
                if !variables.contains(&variable) {
                    variables.push(variable);
                }
            }
        }
        variables
    }

    /// The truth of the formula, given the truth of each atom.
    pub fn evaluate(&self, truth: &impl Fn(&QueryAtom) -> bool) -> bool {
        match self {
            Self::Atom(atom) => truth(atom),
            Self::Negation(inner) => !inner.evaluate(truth),
            Self::Conjunction(children) => children.iter().all(|child| child.evaluate(truth)),
            Self::Disjunction(children) => children.iter().any(|child| child.evaluate(truth)),
            Self::Implication(body, head) => !body.evaluate(truth) || head.evaluate(truth),
        }
    }

    /// A copy of the formula with nested branches of the same type collapsed and duplicate children removed.
    ///
    /// Of duplicates, the first is kept, and a branch with a single child is replaced by the child.
    pub fn flatten(&self) -> Formula {
        match self {
            Self::Atom(_) => self.clone(),
            Self::Negation(inner) => !inner.flatten(),
            Self::Implication(body, head) => Formula::implies(body.flatten(), head.flatten()),

            Self::Conjunction(children) => {
                let mut flat = Vec::with_capacity(children.len());
                for child in children.iter().map(|child| child.flatten()) {
                    match child {
                        Self::Conjunction(grandchildren) => flat.extend(grandchildren),
                        other => flat.push(other),
                    }
                }
                Self::collapse(flat, Formula::Conjunction)
            }

            Self::Disjunction(children) => {
                let mut flat = Vec::with_capacity(children.len());
                for child in children.iter().map(|child| child.flatten()) {
                    match child {
                        Self::Disjunction(grandchildren) => flat.extend(grandchildren),
                        other => flat.push(other),
                    }
                }
                Self::collapse(flat, Formula::Disjunction)
            }
        }
    }

    fn collapse(children: Vec<Formula>, branch: fn(Vec<Formula>) -> Formula) -> Formula {
        let mut unique: Vec<Formula> = Vec::with_capacity(children.len());
        for child in children {
            if !unique.contains(&child) {
                unique.push(child);
            }
        }

        match unique.len() {
            1 => unique.remove(0),
            _ => branch(unique),
        }
    }

    /// The clauses of the disjunctive normal form of the formula, where each clause is a conjunction of literals.
    ///
    /// Literals are unique within a clause, and clauses are unique, with order by first occurrence.
    pub fn dnf_clauses(&self) -> Vec<Vec<Literal>> {
        let mut unique: Vec<Vec<Literal>> = Vec::default();
        for clause in self.clauses(false) {
            let mut literals: Vec<Literal> = Vec::with_capacity(clause.len());
            for literal in clause {
                if !literals.contains(&literal) {
                    literals.push(literal);
                }
            }
            if !unique.contains(&literals) {
                unique.push(literals);
            }
        }
        unique
    }

    fn clauses(&self, negated: bool) -> Vec<Vec<Literal>> {
        match (self, negated) {
            (Self::Atom(atom), _) => vec![vec![Literal::new(atom.clone(), !negated)]],

            (Self::Negation(inner), _) => inner.clauses(!negated),

            (Self::Conjunction(children), false) | (Self::Disjunction(children), true) => {
                Self::product(children.iter().map(|child| child.clauses(negated)))
            }

            (Self::Disjunction(children), false) | (Self::Conjunction(children), true) => children
                .iter()
                .flat_map(|child| child.clauses(negated))
                .collect(),

            (Self::Implication(body, head), false) => {
                let mut clauses = body.clauses(true);
                clauses.extend(head.clauses(false));
                clauses
            }

            (Self::Implication(body, head), true) => {
                Self::product([body.clauses(false), head.clauses(true)].into_iter())
            }
        }
    }

    /// The conjunction of each combination of clauses, one from each disjunction.
    fn product(disjunctions: impl Iterator<Item = Vec<Vec<Literal>>>) -> Vec<Vec<Literal>> {
        let mut product: Vec<Vec<Literal>> = vec![Vec::default()];
        for disjunction in disjunctions {
            let mut extended = Vec::with_capacity(product.len() * disjunction.len());
            for prefix in &product {
                for clause in &disjunction {
                    let mut combined = prefix.clone();
                    combined.extend(clause.iter().cloned());
                    extended.push(combined);
                }
            }
            product = extended;
        }
        product
    }

    /// An equivalent formula in disjunctive normal form.
    pub fn dnf(&self) -> Formula {
        let conjunct = |mut clause: Vec<Literal>| match clause.len() {
            1 => Formula::from(clause.remove(0)),
            _ => Formula::Conjunction(clause.into_iter().map(Formula::from).collect()),
        };

        let mut clauses = self.dnf_clauses();
        match clauses.len() {
            1 => conjunct(clauses.remove(0)),
            _ => Formula::Disjunction(clauses.into_iter().map(conjunct).collect()),
        }
    }
}

#[cfg(test)]
mod formula_tests {
    use super::*;
    use crate::structures::constant::Argument;

    fn atom(predicate: u32) -> Formula {
        Formula::Atom(QueryAtom {
            predicate,
            arguments: vec![Argument::var("A")],
        })
    }

    #[test]
    fn flatten_nested() {
        let (p, q, r) = (atom(3), atom(4), atom(5));
        let nested = Formula::and(vec![
            p.clone(),
            Formula::and(vec![q.clone(), p.clone()]),
            Formula::or(vec![r.clone()]),
        ]);

        assert_eq!(nested.flatten(), Formula::and(vec![p.clone(), q, r]));
        assert_eq!(Formula::or(vec![p.clone(), p.clone()]).flatten(), p);
    }

    #[test]
    fn double_negation() {
        let p = atom(3);
        assert_eq!((!!p.clone()).dnf(), p);
    }

    #[test]
    fn distribution() {
        let (p, q, r) = (atom(3), atom(4), atom(5));
        let formula = Formula::and(vec![p.clone(), Formula::or(vec![q.clone(), r.clone()])]);
        let dnf = formula.dnf();

        assert!(dnf.is_dnf());
        assert_eq!(
            dnf,
            Formula::or(vec![
                Formula::and(vec![p.clone(), q]),
                Formula::and(vec![p, r])
            ])
        );
    }

    #[test]
    fn implication_shapes() {
        let (p, q) = (atom(3), atom(4));
        let implication = Formula::implies(p.clone(), q.clone());

        assert_eq!(implication.dnf(), Formula::or(vec![!p.clone(), q.clone()]));
        assert_eq!(implication.dnf_clauses().len(), 2);
        assert!(!implication.is_dnf());
    }
}
