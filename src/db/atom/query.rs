/*!
Queries over the atom database.

A query is a conjunction of atoms, where:
- Each atom over a standard predicate is matched against the persisted atoms of the predicate, whatever the value of the atom.
- Each atom over a grounding-only predicate, possibly negated, filters substitutions by the computed value of the atom.

Variables of the query may be given bindings ahead of execution, in which case only substitutions which agree with the bindings are returned.

# Execution

The query is compiled to a list of *scans*, one for each standard atom, and a list of *filters*, one for each grounding-only literal.
Each variable is given a slot, and substitutions are built by backtracking through the scans in order, with a filter applied as soon as each of the variables of the filter has a value.
*/

use crate::{
    db::atom::AtomDB,
    misc::log::targets::{self},
    structures::{
        atom::{QueryAtom, Substitution},
        constant::{Argument, Constant, Variable},
        formula::Formula,
        predicate::{Builtin, Registry},
    },
    types::err::{ErrorKind, QueryError},
};

/// A query, with optional bindings of variables.
#[derive(Clone, Debug)]
pub struct Query {
    pub formula: Formula,
    pub bindings: Substitution,
}

impl Query {
    pub fn new(formula: Formula) -> Self {
        Query {
            formula,
            bindings: Substitution::default(),
        }
    }

    pub fn with_bindings(formula: Formula, bindings: Substitution) -> Self {
        Query { formula, bindings }
    }
}

/// The rows of a query result, each a substitution for every variable of the query.
#[derive(Clone, Debug, Default)]
pub struct ResultRelation {
    variables: Vec<Variable>,
    rows: Vec<Vec<Constant>>,
}

impl ResultRelation {
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, row: usize) -> &[Constant] {
        &self.rows[row]
    }

    /// The value of a variable on some row.
    pub fn get(&self, row: usize, variable: &Variable) -> Option<&Constant> {
        let column = self.variables.iter().position(|v| v == variable)?;
        self.rows.get(row).map(|constants| &constants[column])
    }

    /// Some row, as a substitution.
    pub fn substitution(&self, row: usize) -> Substitution {
        self.variables
            .iter()
            .cloned()
            .zip(self.rows[row].iter().cloned())
            .collect()
    }
}

/// An argument of a compiled atom.
#[derive(Clone, Debug)]
enum Slot {
    Constant(Constant),
    Variable(usize),
}

struct Scan {
    predicate: u32,
    slots: Vec<Slot>,
}

struct Filter {
    builtin: Builtin,
    polarity: bool,
    slots: Vec<Slot>,
}

struct Plan {
    scans: Vec<Scan>,

    /// Filters, by the count of scans after which every variable of the filter has a value.
    filters: Vec<Vec<Filter>>,

    variables: Vec<Variable>,
}

impl Plan {
    fn compile(query: &Query, registry: &Registry) -> Result<Plan, QueryError> {
        let mut standard: Vec<&QueryAtom> = Vec::default();
        let mut functional: Vec<(&QueryAtom, bool)> = Vec::default();

        let literals: Vec<&Formula> = match &query.formula {
            Formula::Conjunction(children) => children.iter().collect(),
            other => vec![other],
        };

        for formula in literals {
            let (atom, polarity) = match formula {
                Formula::Atom(atom) => (atom, true),
                Formula::Negation(inner) => match inner.as_ref() {
                    Formula::Atom(atom) => (atom, false),
                    _ => return Err(QueryError::UnsupportedFormula),
                },
                _ => return Err(QueryError::UnsupportedFormula),
            };
            match (registry.get(atom.predicate).is_standard(), polarity) {
                (true, true) => standard.push(atom),
                (true, false) => return Err(QueryError::UnsupportedFormula),
                (false, _) => functional.push((atom, polarity)),
            }
        }

        let mut variables: Vec<Variable> = Vec::default();
        let mut slot_of = |argument: &Argument| match argument {
            Argument::Constant(c) => Slot::Constant(c.clone()),
            Argument::Variable(v) => match variables.iter().position(|known| known == v) {
                Some(index) => Slot::Variable(index),
                None => {
                    variables.push(v.clone());
                    Slot::Variable(variables.len() - 1)
                }
            },
        };

        let scans = standard
            .iter()
            .map(|atom| Scan {
                predicate: atom.predicate,
                slots: atom.arguments.iter().map(&mut slot_of).collect(),
            })
            .collect::<Vec<_>>();

        let functional = functional
            .iter()
            .map(|(atom, polarity)| {
                let builtin = registry.get(atom.predicate).builtin();
                let slots = atom.arguments.iter().map(&mut slot_of).collect::<Vec<_>>();
                (builtin, *polarity, slots)
            })
            .collect::<Vec<_>>();

        // The count of scans after which a variable has a value, where bound variables have a value from the start.
        let mut bound_after = vec![None; variables.len()];
        for (index, variable) in variables.iter().enumerate() {
            if query.bindings.contains_key(variable) {
                bound_after[index] = Some(0);
            }
        }
        for (position, scan) in scans.iter().enumerate() {
            for slot in &scan.slots {
                if let Slot::Variable(index) = slot {
                    if bound_after[*index].is_none() {
                        bound_after[*index] = Some(position + 1);
                    }
                }
            }
        }

        let mut filters: Vec<Vec<Filter>> = (0..=scans.len()).map(|_| Vec::default()).collect();
        for (builtin, polarity, slots) in functional {
            let Some(builtin) = builtin else {
                return Err(QueryError::UnsupportedFormula);
            };

            let mut after = 0;
            for slot in &slots {
                if let Slot::Variable(index) = slot {
                    match bound_after[*index] {
                        Some(position) => after = after.max(position),
                        None => return Err(QueryError::UnboundFunctional),
                    }
                }
            }

            filters[after].push(Filter {
                builtin,
                polarity,
                slots,
            });
        }

        Ok(Plan {
            scans,
            filters,
            variables,
        })
    }
}

struct Execution<'a> {
    db: &'a AtomDB,
    plan: &'a Plan,
    assignment: Vec<Option<Constant>>,
    rows: Vec<Vec<Constant>>,
}

impl Execution<'_> {
    fn value_of<'s>(&'s self, slot: &'s Slot) -> Option<&'s Constant> {
        match slot {
            Slot::Constant(c) => Some(c),
            Slot::Variable(index) => self.assignment[*index].as_ref(),
        }
    }

    fn filters_hold(&self, depth: usize) -> Result<bool, ErrorKind> {
        for filter in &self.plan.filters[depth] {
            let mut arguments = Vec::with_capacity(filter.slots.len());
            for slot in &filter.slots {
                match self.value_of(slot) {
                    Some(constant) => arguments.push(constant.clone()),
                    None => return Err(ErrorKind::from(QueryError::UnboundFunctional)),
                }
            }
            let truth = filter.builtin.compute(&arguments)? > 0.0;
            if truth != filter.polarity {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn join(&mut self, depth: usize) -> Result<(), ErrorKind> {
        if !self.filters_hold(depth)? {
            return Ok(());
        }

        let (db, plan) = (self.db, self.plan);
        let Some(scan) = plan.scans.get(depth) else {
            let mut row = Vec::with_capacity(self.assignment.len());
            for value in &self.assignment {
                match value {
                    Some(constant) => row.push(constant.clone()),
                    None => return Err(ErrorKind::from(QueryError::UnboundFunctional)),
                }
            }
            self.rows.push(row);
            return Ok(());
        };

        let mut fresh: Vec<usize> = Vec::with_capacity(scan.slots.len());

        'atom_loop: for atom in db.persisted(scan.predicate) {
            let arguments = &db.atom(*atom).arguments;

            for index in fresh.drain(..) {
                self.assignment[index] = None;
            }

            for (slot, argument) in scan.slots.iter().zip(arguments) {
                match slot {
                    Slot::Constant(c) => {
                        if c != argument {
                            continue 'atom_loop;
                        }
                    }
                    Slot::Variable(index) => match &self.assignment[*index] {
                        Some(value) => {
                            if value != argument {
                                continue 'atom_loop;
                            }
                        }
                        None => {
                            self.assignment[*index] = Some(argument.clone());
                            fresh.push(*index);
                        }
                    },
                }
            }

            self.join(depth + 1)?;
        }

        for index in fresh.drain(..) {
            self.assignment[index] = None;
        }

        Ok(())
    }
}

impl Query {
    /// Executes the query against the persisted atoms of the database.
    pub fn execute(&self, db: &AtomDB, registry: &Registry) -> Result<ResultRelation, ErrorKind> {
        let plan = Plan::compile(self, registry)?;

        let assignment = plan
            .variables
            .iter()
            .map(|variable| self.bindings.get(variable).cloned())
            .collect::<Vec<_>>();

        let mut execution = Execution {
            db,
            plan: &plan,
            assignment,
            rows: Vec::default(),
        };
        execution.join(0)?;

        log::trace!(target: targets::QUERY, "{} rows from {:?}", execution.rows.len(), self.formula);

        Ok(ResultRelation {
            rows: execution.rows,
            variables: plan.variables,
        })
    }
}

#[cfg(test)]
mod query_tests {
    use super::*;
    use crate::{
        db::atom::AtomManager,
        structures::{constant::ConstantType, predicate::Builtin},
    };

    fn setup() -> (Registry, AtomDB, u32, u32) {
        let mut registry = Registry::default();
        let knows = registry
            .add_predicate("Knows", &[ConstantType::Text, ConstantType::Text], true)
            .unwrap();
        let person = registry
            .add_predicate("Person", &[ConstantType::Text], true)
            .unwrap();

        let mut db = AtomDB::default();
        for name in ["a", "b", "c"] {
            db.observe(&registry, person, vec![name.into()], 1.0).unwrap();
        }
        db.observe(&registry, knows, vec!["a".into(), "b".into()], 1.0)
            .unwrap();
        db.observe(&registry, knows, vec!["b".into(), "c".into()], 0.0)
            .unwrap();
        db.observe(&registry, knows, vec!["c".into(), "c".into()], 1.0)
            .unwrap();

        (registry, db, knows, person)
    }

    #[test]
    fn join_on_shared_variables() {
        let (registry, db, knows, _) = setup();

        let kab = registry
            .atom(knows, vec![Argument::var("A"), Argument::var("B")])
            .unwrap();
        let kbc = registry
            .atom(knows, vec![Argument::var("B"), Argument::var("C")])
            .unwrap();

        let query = Query::new(Formula::and(vec![kab.into(), kbc.into()]));
        let result = db.execute_query(&registry, &query).unwrap();

        // a-b-c, b-c-c, and c-c-c
        assert_eq!(result.len(), 3);
        assert_eq!(result.variables().len(), 3);
    }

    #[test]
    fn filters_and_bindings() {
        let (registry, db, _, person) = setup();

        let pa = registry.atom(person, vec![Argument::var("A")]).unwrap();
        let pb = registry.atom(person, vec![Argument::var("B")]).unwrap();
        let ne = registry
            .atom(
                registry.builtin(Builtin::NotEqual),
                vec![Argument::var("A"), Argument::var("B")],
            )
            .unwrap();

        let all = Query::new(Formula::and(vec![pa.clone().into(), pb.clone().into()]));
        assert_eq!(db.execute_query(&registry, &all).unwrap().len(), 9);

        let distinct = Query::new(Formula::and(vec![
            pa.clone().into(),
            pb.clone().into(),
            ne.clone().into(),
        ]));
        assert_eq!(db.execute_query(&registry, &distinct).unwrap().len(), 6);

        let same = Query::new(Formula::and(vec![pa.clone().into(), pb.clone().into(), !Formula::from(ne.clone())]));
        assert_eq!(db.execute_query(&registry, &same).unwrap().len(), 3);

        let mut bindings = Substitution::default();
        bindings.insert(Variable::new("A"), Constant::from("a"));
        let bound = Query::with_bindings(
            Formula::and(vec![pa.into(), pb.into(), ne.into()]),
            bindings,
        );
        let result = db.execute_query(&registry, &bound).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get(0, &Variable::new("A")), Some(&Constant::from("a")));
    }

    #[test]
    fn unsupported_queries() {
        let (registry, db, _, person) = setup();
        let pa = registry.atom(person, vec![Argument::var("A")]).unwrap();
        let ne = registry
            .atom(
                registry.builtin(Builtin::NotEqual),
                vec![Argument::var("A"), Argument::var("Z")],
            )
            .unwrap();

        let negated = Query::new(!Formula::from(pa.clone()));
        assert_eq!(
            db.execute_query(&registry, &negated).err(),
            Some(ErrorKind::Query(QueryError::UnsupportedFormula))
        );

        let unbound = Query::new(Formula::and(vec![pa.into(), ne.into()]));
        assert_eq!(
            db.execute_query(&registry, &unbound).err(),
            Some(ErrorKind::Query(QueryError::UnboundFunctional))
        );
    }
}
