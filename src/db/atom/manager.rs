use crate::{
    db::{
        atom::{
            query::{Query, ResultRelation},
            AtomDB, AtomStatus,
        },
        AtomIndex, GroundRuleKey,
    },
    misc::log::targets::{self},
    structures::{
        constant::Constant,
        predicate::{PredicateId, PredicateKind, Registry},
    },
    types::err::ErrorKind,
};

/// The interface between grounding and a store of atoms.
///
/// Grounding issues [queries](Query) for substitutions, and resolves each ground atom of a ground rule through [get_atom](AtomManager::get_atom).
/// Ground rules are registered with each of their atoms once stored.
///
/// Queries are read-only, and so may be issued from many threads at once.
pub trait AtomManager {
    /// The index of the atom, which may be created if not already stored.
    fn get_atom(
        &mut self,
        registry: &Registry,
        predicate: PredicateId,
        arguments: &[Constant],
    ) -> Result<AtomIndex, ErrorKind>;

    /// The substitutions which satisfy the query.
    fn execute_query(&self, registry: &Registry, query: &Query) -> Result<ResultRelation, ErrorKind>;

    fn value(&self, atom: AtomIndex) -> f32;

    /// The values of all atoms, indexed by atom.
    fn values(&self) -> &[f32];

    fn is_random_variable(&self, atom: AtomIndex) -> bool;

    fn register_ground_rule(&mut self, atom: AtomIndex, key: GroundRuleKey);

    fn unregister_ground_rule(&mut self, atom: AtomIndex, key: GroundRuleKey);
}

impl AtomManager for AtomDB {
    fn get_atom(
        &mut self,
        registry: &Registry,
        predicate: PredicateId,
        arguments: &[Constant],
    ) -> Result<AtomIndex, ErrorKind> {
        if let Some(atom) = self.find(predicate, arguments) {
            return Ok(atom);
        }

        let atom = match registry.get(predicate).kind {
            PredicateKind::GroundingOnly(builtin) => {
                let value = builtin.compute(arguments)?;
                self.fresh_atom(predicate, arguments.to_vec(), AtomStatus::Observed, false, value)
            }

            PredicateKind::Closed => {
                self.fresh_atom(predicate, arguments.to_vec(), AtomStatus::Observed, false, 0.0)
            }

            PredicateKind::Open => {
                let atom = self.fresh_atom(
                    predicate,
                    arguments.to_vec(),
                    AtomStatus::RandomVariable,
                    false,
                    0.0,
                );
                self.lazy.insert(atom);
                log::trace!(target: targets::ATOM_DB, "Lazy atom {atom}");
                atom
            }
        };

        Ok(atom)
    }

    fn execute_query(&self, registry: &Registry, query: &Query) -> Result<ResultRelation, ErrorKind> {
        query.execute(self, registry)
    }

    fn value(&self, atom: AtomIndex) -> f32 {
        self.values[atom as usize]
    }

    fn values(&self) -> &[f32] {
        &self.values
    }

    fn is_random_variable(&self, atom: AtomIndex) -> bool {
        self.atoms[atom as usize].status == AtomStatus::RandomVariable
    }

    fn register_ground_rule(&mut self, atom: AtomIndex, key: GroundRuleKey) {
        let rules = &mut self.atoms[atom as usize].ground_rules;
        if !rules.contains(&key) {
            rules.push(key);
        }
    }

    fn unregister_ground_rule(&mut self, atom: AtomIndex, key: GroundRuleKey) {
        self.atoms[atom as usize]
            .ground_rules
            .retain(|rule| *rule != key);
    }
}
