/*!
A database of ground atoms.

Each atom is stored once, and referred to by [AtomIndex] everywhere else.
Values of atoms are held in a separate array, indexed in the same way, so a reasoner may read and write values without touching the atoms.

# Status

An atom is either *observed*, in which case the value of the atom is fixed, or a *random variable*, in which case the value of the atom is inferred.

Atoms are added in one of three ways:
- [observe](AtomDB::observe), for an observed atom.
- [target](AtomDB::target), for a random variable atom.
- During grounding, through [get_atom](AtomManager::get_atom), when a ground rule refers to an atom not otherwise stored.

Only the first two *persist* an atom, and queries range over persisted atoms only.
An atom created during grounding is:
- Observed false, if the predicate is closed.
- A random variable with value zero, if the predicate is open.
  Such an atom is *lazy*, and may later be [activated](AtomDB::activate) if inference gives it a value above some threshold.
- Observed with a computed value, if the predicate is grounding-only.

# Ground rules

Each atom records the ground rules which contain the atom, so a ground rule may be unregistered from its atoms when removed.
*/

mod manager;
pub use manager::AtomManager;
pub mod query;

use std::collections::{BTreeSet, HashMap};

use crate::{
    db::{AtomIndex, GroundRuleKey},
    misc::log::targets::{self},
    structures::{
        constant::Constant,
        predicate::{PredicateId, PredicateKind, Registry},
    },
    types::err::{self, AtomDBError, ErrorKind},
};

/// The status of an atom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtomStatus {
    Observed,
    RandomVariable,
}

/// A ground atom.
#[derive(Clone, Debug)]
pub struct GroundAtom {
    pub predicate: PredicateId,
    pub arguments: Vec<Constant>,
    pub status: AtomStatus,

    /// Whether the atom was added (or activated), rather than created during grounding.
    pub persisted: bool,

    ground_rules: Vec<GroundRuleKey>,
}

impl GroundAtom {
    /// The keys of the ground rules which contain the atom.
    pub fn ground_rules(&self) -> &[GroundRuleKey] {
        &self.ground_rules
    }
}

/// The atom database.
#[derive(Default)]
pub struct AtomDB {
    atoms: Vec<GroundAtom>,

    values: Vec<f32>,

    index: HashMap<(PredicateId, Vec<Constant>), AtomIndex>,

    /// Persisted atoms, by predicate.
    persisted: HashMap<PredicateId, Vec<AtomIndex>>,

    /// Random variables created during grounding, and not yet activated.
    lazy: BTreeSet<AtomIndex>,
}

impl AtomDB {
    /// A count of atoms in the database.
    pub fn count(&self) -> usize {
        self.atoms.len()
    }

    /// The atom at the given index.
    pub fn atom(&self, atom: AtomIndex) -> &GroundAtom {
        &self.atoms[atom as usize]
    }

    /// The index of an atom, if stored.
    pub fn find(&self, predicate: PredicateId, arguments: &[Constant]) -> Option<AtomIndex> {
        // A lookup without allocation would require a borrowed key.
        self.index.get(&(predicate, arguments.to_vec())).copied()
    }

    /// The value of an atom, if stored.
    pub fn value_of(&self, predicate: PredicateId, arguments: &[Constant]) -> Option<f32> {
        self.find(predicate, arguments)
            .map(|atom| self.values[atom as usize])
    }

    /// The values of all atoms, indexed by atom.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// The values of all atoms, for a reasoner to write to.
    ///
    /// Values of observed atoms must not be changed.
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Sets the value of a random variable atom.
    pub fn set_value(&mut self, atom: AtomIndex, value: f32) -> Result<(), AtomDBError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(AtomDBError::ValueOutOfRange);
        }
        match self.atoms[atom as usize].status {
            AtomStatus::Observed => Err(AtomDBError::FixedAtom),
            AtomStatus::RandomVariable => {
                self.values[atom as usize] = value;
                Ok(())
            }
        }
    }

    /// Every random variable atom, lazy or otherwise.
    pub fn random_variables(&self) -> impl Iterator<Item = AtomIndex> + '_ {
        self.atoms
            .iter()
            .enumerate()
            .filter(|(_, atom)| atom.status == AtomStatus::RandomVariable)
            .map(|(index, _)| index as AtomIndex)
    }

    /// Random variable atoms created during grounding, and not yet activated.
    pub fn lazy_atoms(&self) -> impl Iterator<Item = AtomIndex> + '_ {
        self.lazy.iter().copied()
    }

    /// Persisted atoms of the given predicate.
    pub fn persisted(&self, predicate: PredicateId) -> &[AtomIndex] {
        match self.persisted.get(&predicate) {
            Some(atoms) => atoms,
            None => &[],
        }
    }

    fn fresh_atom(
        &mut self,
        predicate: PredicateId,
        arguments: Vec<Constant>,
        status: AtomStatus,
        persisted: bool,
        value: f32,
    ) -> AtomIndex {
        let index = self.atoms.len() as AtomIndex;
        self.index.insert((predicate, arguments.clone()), index);
        self.atoms.push(GroundAtom {
            predicate,
            arguments,
            status,
            persisted,
            ground_rules: Vec::default(),
        });
        self.values.push(value);
        if persisted {
            self.persisted.entry(predicate).or_default().push(index);
        }
        index
    }

    fn persist(&mut self, atom: AtomIndex) {
        let the_atom = &mut self.atoms[atom as usize];
        if !the_atom.persisted {
            the_atom.persisted = true;
            self.persisted
                .entry(the_atom.predicate)
                .or_default()
                .push(atom);
        }
        self.lazy.remove(&atom);
    }

    fn check_value(value: f32) -> Result<(), AtomDBError> {
        match (0.0..=1.0).contains(&value) {
            true => Ok(()),
            false => Err(AtomDBError::ValueOutOfRange),
        }
    }

    /// Adds an observed atom, or updates the value of an observed atom.
    pub fn observe(
        &mut self,
        registry: &Registry,
        predicate: PredicateId,
        arguments: Vec<Constant>,
        value: f32,
    ) -> Result<AtomIndex, ErrorKind> {
        registry.check_arguments(predicate, arguments.iter().map(Some))?;
        if !registry.get(predicate).is_standard() {
            return Err(err::ErrorKind::from(AtomDBError::FunctionalPredicate));
        }
        AtomDB::check_value(value)?;

        match self.find(predicate, &arguments) {
            Some(atom) => {
                if self.atoms[atom as usize].status == AtomStatus::RandomVariable {
                    log::warn!(target: targets::ATOM_DB, "Observation of random variable atom {atom}");
                    return Err(err::ErrorKind::from(AtomDBError::StatusConflict));
                }
                self.values[atom as usize] = value;
                self.persist(atom);
                Ok(atom)
            }

            None => {
                let atom = self.fresh_atom(predicate, arguments, AtomStatus::Observed, true, value);
                log::trace!(target: targets::ATOM_DB, "Observed atom {atom} with value {value}");
                Ok(atom)
            }
        }
    }

    /// Adds a random variable atom, with an initial value.
    ///
    /// A lazy atom of the same predicate and arguments is persisted.
    pub fn target(
        &mut self,
        registry: &Registry,
        predicate: PredicateId,
        arguments: Vec<Constant>,
        value: f32,
    ) -> Result<AtomIndex, ErrorKind> {
        registry.check_arguments(predicate, arguments.iter().map(Some))?;
        match registry.get(predicate).kind {
            PredicateKind::Open => {}
            PredicateKind::Closed => {
                return Err(err::ErrorKind::from(AtomDBError::ClosedPredicateTarget))
            }
            PredicateKind::GroundingOnly(_) => {
                return Err(err::ErrorKind::from(AtomDBError::FunctionalPredicate))
            }
        }
        AtomDB::check_value(value)?;

        match self.find(predicate, &arguments) {
            Some(atom) => {
                if self.atoms[atom as usize].status == AtomStatus::Observed {
                    return Err(err::ErrorKind::from(AtomDBError::StatusConflict));
                }
                self.values[atom as usize] = value;
                self.persist(atom);
                Ok(atom)
            }

            None => {
                let atom =
                    self.fresh_atom(predicate, arguments, AtomStatus::RandomVariable, true, value);
                log::trace!(target: targets::ATOM_DB, "Target atom {atom}");
                Ok(atom)
            }
        }
    }

    /// Persists each lazy atom with a value of at least `threshold`, and returns the persisted atoms.
    pub fn activate(&mut self, threshold: f32) -> Vec<AtomIndex> {
        let activated = self
            .lazy
            .iter()
            .copied()
            .filter(|atom| self.values[*atom as usize] >= threshold)
            .collect::<Vec<_>>();

        for atom in &activated {
            self.persist(*atom);
        }

        log::debug!(target: targets::ATOM_DB, "Activated {} of {} lazy atoms", activated.len(), activated.len() + self.lazy.len());
        activated
    }
}

#[cfg(test)]
mod atom_db_tests {
    use super::*;
    use crate::structures::constant::ConstantType;

    fn setup() -> (Registry, PredicateId, PredicateId) {
        let mut registry = Registry::default();
        let knows = registry
            .add_predicate("Knows", &[ConstantType::Text, ConstantType::Text], true)
            .unwrap();
        let likes = registry
            .add_predicate("Likes", &[ConstantType::Text], false)
            .unwrap();
        (registry, knows, likes)
    }

    #[test]
    fn observe_and_target() {
        let (registry, knows, likes) = setup();
        let mut db = AtomDB::default();

        let k = db
            .observe(&registry, knows, vec!["a".into(), "b".into()], 1.0)
            .unwrap();
        let l = db.target(&registry, likes, vec!["a".into()], 0.5).unwrap();

        assert_eq!(db.value_of(knows, &["a".into(), "b".into()]), Some(1.0));
        assert_eq!(db.random_variables().collect::<Vec<_>>(), vec![l]);
        assert_eq!(db.persisted(knows), &[k]);

        assert_eq!(
            db.target(&registry, knows, vec!["a".into(), "b".into()], 0.5),
            Err(ErrorKind::AtomDB(AtomDBError::ClosedPredicateTarget))
        );
        assert_eq!(
            db.observe(&registry, likes, vec!["a".into()], 0.5),
            Err(ErrorKind::AtomDB(AtomDBError::StatusConflict))
        );
        assert_eq!(
            db.observe(&registry, knows, vec!["a".into(), "c".into()], 1.5),
            Err(ErrorKind::AtomDB(AtomDBError::ValueOutOfRange))
        );
        assert_eq!(db.set_value(k, 0.0), Err(AtomDBError::FixedAtom));
        assert!(db.set_value(l, 0.0).is_ok());
    }

    #[test]
    fn lazy_atoms_activate() {
        let (registry, _, likes) = setup();
        let mut db = AtomDB::default();

        let lazy = db
            .get_atom(&registry, likes, &["a".into()])
            .unwrap();
        let other = db
            .get_atom(&registry, likes, &["b".into()])
            .unwrap();

        assert!(db.persisted(likes).is_empty());
        assert_eq!(db.lazy_atoms().count(), 2);

        db.values_mut()[lazy as usize] = 0.5;
        assert_eq!(db.activate(0.01), vec![lazy]);
        assert_eq!(db.persisted(likes), &[lazy]);
        assert_eq!(db.lazy_atoms().collect::<Vec<_>>(), vec![other]);
    }
}
