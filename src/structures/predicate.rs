/*!
Predicates, and the registry of predicates.

A predicate is one of:
- *Open*, in which case atoms of the predicate may be random variables.
- *Closed*, in which case every atom of the predicate is observed, and any atom not stored is observed false.
- *Grounding-only*, in which case the value of an atom is computed from its arguments, and atoms are never stored.
  These are used to filter the substitutions of a rule, e.g. to avoid grounding `Friends(A, A)`.

Predicates are registered with a [Registry], which is owned by a [context](crate::context) and passed by reference to grounding.
So, there is no global state, and independent models may be built alongside one another.

The grounding-only predicates are registered with every registry, under the names `#Equal`, `#NotEqual`, and `#NonSymmetric`.
*/

use std::collections::HashMap;

use crate::{
    structures::{
        atom::QueryAtom,
        constant::{Argument, Constant, ConstantType},
    },
    types::err::{GroundingError, RegistryError},
};

/// The index of a predicate in a registry.
pub type PredicateId = u32;

/// Grounding-only predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// True if the arguments are equal.
    Equal,

    /// True if the arguments are not equal.
    NotEqual,

    /// True if the first argument is less than the second.
    /// Used to ground only one of a symmetric pair of ground rules.
    NonSymmetric,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equal => "#Equal",
            Self::NotEqual => "#NotEqual",
            Self::NonSymmetric => "#NonSymmetric",
        }
    }

    /// The truth value of the predicate on the given arguments.
    pub fn compute(&self, arguments: &[Constant]) -> Result<f32, GroundingError> {
        let [a, b] = arguments else {
            return Err(GroundingError::BuiltinArity);
        };

        if a.constant_type() != b.constant_type() {
            return Err(GroundingError::BuiltinTypeMismatch);
        }

        let truth = match self {
            Self::Equal => a == b,
            Self::NotEqual => a != b,
            Self::NonSymmetric => a < b,
        };

        Ok(if truth { 1.0 } else { 0.0 })
    }
}

/// The kind of a predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredicateKind {
    Open,
    Closed,
    GroundingOnly(Builtin),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub name: String,
    pub argument_types: Vec<ConstantType>,
    pub kind: PredicateKind,
}

impl Predicate {
    pub fn arity(&self) -> usize {
        self.argument_types.len()
    }

    /// Whether the atoms of the predicate are stored, i.e. the predicate is not grounding-only.
    pub fn is_standard(&self) -> bool {
        !matches!(self.kind, PredicateKind::GroundingOnly(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.kind, PredicateKind::Closed)
    }

    pub fn builtin(&self) -> Option<Builtin> {
        match self.kind {
            PredicateKind::GroundingOnly(builtin) => Some(builtin),
            _ => None,
        }
    }
}

/// A registry of predicates.
#[derive(Clone, Debug)]
pub struct Registry {
    predicates: Vec<Predicate>,
    names: HashMap<String, PredicateId>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry {
            predicates: Vec::default(),
            names: HashMap::default(),
        };

        for builtin in [Builtin::Equal, Builtin::NotEqual, Builtin::NonSymmetric] {
            registry.insert(Predicate {
                name: builtin.name().to_string(),
                argument_types: vec![ConstantType::Deferred, ConstantType::Deferred],
                kind: PredicateKind::GroundingOnly(builtin),
            });
        }

        registry
    }
}

impl Registry {
    fn insert(&mut self, predicate: Predicate) -> PredicateId {
        let id = self.predicates.len() as PredicateId;
        self.names.insert(predicate.name.clone(), id);
        self.predicates.push(predicate);
        id
    }

    /// Registers a standard predicate, open unless `closed`.
    ///
    /// Registering a predicate twice with the same signature returns the existing id.
    pub fn add_predicate(
        &mut self,
        name: &str,
        argument_types: &[ConstantType],
        closed: bool,
    ) -> Result<PredicateId, RegistryError> {
        if name.is_empty() || name.starts_with('#') {
            return Err(RegistryError::InvalidName);
        }
        if argument_types.is_empty() {
            return Err(RegistryError::EmptyArguments);
        }

        let kind = match closed {
            true => PredicateKind::Closed,
            false => PredicateKind::Open,
        };

        if let Some(&id) = self.names.get(name) {
            let existing = &self.predicates[id as usize];
            return match existing.argument_types == argument_types && existing.kind == kind {
                true => Ok(id),
                false => Err(RegistryError::NameConflict(name.to_string())),
            };
        }

        Ok(self.insert(Predicate {
            name: name.to_string(),
            argument_types: argument_types.to_vec(),
            kind,
        }))
    }

    /// The id of the predicate with the given name.
    pub fn id(&self, name: &str) -> Result<PredicateId, RegistryError> {
        match self.names.get(name) {
            Some(id) => Ok(*id),
            None => Err(RegistryError::UnknownPredicate(name.to_string())),
        }
    }

    /// The predicate with the given id.
    ///
    /// Ids are only issued by the registry, and so a predicate always exists.
    pub fn get(&self, id: PredicateId) -> &Predicate {
        &self.predicates[id as usize]
    }

    pub fn builtin(&self, builtin: Builtin) -> PredicateId {
        match builtin {
            Builtin::Equal => 0,
            Builtin::NotEqual => 1,
            Builtin::NonSymmetric => 2,
        }
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Ok if the arguments match the signature of the predicate.
    pub fn check_arguments<'a>(
        &self,
        id: PredicateId,
        arguments: impl ExactSizeIterator<Item = Option<&'a Constant>>,
    ) -> Result<(), RegistryError> {
        let predicate = self.get(id);

        if arguments.len() != predicate.arity() {
            return Err(RegistryError::ArityMismatch {
                predicate: predicate.name.clone(),
                expected: predicate.arity(),
                found: arguments.len(),
            });
        }

        for (position, (argument, expected)) in
            arguments.zip(predicate.argument_types.iter()).enumerate()
        {
            if let Some(constant) = argument {
                if !expected.admits(constant) {
                    return Err(RegistryError::TypeMismatch {
                        predicate: predicate.name.clone(),
                        position,
                    });
                }
            }
        }

        Ok(())
    }

    /// An atom of the predicate, for use in a formula.
    pub fn atom(
        &self,
        id: PredicateId,
        arguments: Vec<Argument>,
    ) -> Result<QueryAtom, RegistryError> {
        self.check_arguments(
            id,
            arguments.iter().map(|argument| match argument {
                Argument::Constant(c) => Some(c),
                Argument::Variable(_) => None,
            }),
        )?;

        Ok(QueryAtom {
            predicate: id,
            arguments,
        })
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn registration() {
        let mut registry = Registry::default();

        let friends = registry
            .add_predicate("Friends", &[ConstantType::Text, ConstantType::Text], true)
            .unwrap();

        assert_eq!(registry.id("Friends"), Ok(friends));
        assert_eq!(
            registry.add_predicate("Friends", &[ConstantType::Text, ConstantType::Text], true),
            Ok(friends)
        );
        assert!(matches!(
            registry.add_predicate("Friends", &[ConstantType::Text], true),
            Err(RegistryError::NameConflict(_))
        ));
        assert_eq!(
            registry.add_predicate("Empty", &[], true),
            Err(RegistryError::EmptyArguments)
        );
        assert_eq!(
            registry.add_predicate("#Mine", &[ConstantType::Text], true),
            Err(RegistryError::InvalidName)
        );
    }

    #[test]
    fn atom_signatures() {
        let mut registry = Registry::default();
        let age = registry
            .add_predicate("Age", &[ConstantType::Text, ConstantType::Integer], true)
            .unwrap();

        assert!(registry
            .atom(age, vec![Argument::var("A"), Argument::constant(3_i64)])
            .is_ok());

        assert!(matches!(
            registry.atom(age, vec![Argument::var("A")]),
            Err(RegistryError::ArityMismatch { expected: 2, found: 1, .. })
        ));

        assert!(matches!(
            registry.atom(age, vec![Argument::var("A"), Argument::constant("three")]),
            Err(RegistryError::TypeMismatch { position: 1, .. })
        ));
    }

    #[test]
    fn builtins() {
        let registry = Registry::default();
        let not_equal = registry.get(registry.builtin(Builtin::NotEqual));
        assert!(!not_equal.is_standard());
        assert_eq!(registry.id("#NotEqual"), Ok(registry.builtin(Builtin::NotEqual)));

        let a = Constant::from("a");
        let b = Constant::from("b");
        assert_eq!(Builtin::NotEqual.compute(&[a.clone(), b.clone()]), Ok(1.0));
        assert_eq!(Builtin::Equal.compute(&[a.clone(), b.clone()]), Ok(0.0));
        assert_eq!(Builtin::NonSymmetric.compute(&[a.clone(), b.clone()]), Ok(1.0));
        assert_eq!(Builtin::NonSymmetric.compute(&[b, a.clone()]), Ok(0.0));
        assert_eq!(
            Builtin::Equal.compute(&[a, Constant::from(1_i64)]),
            Err(GroundingError::BuiltinTypeMismatch)
        );
    }
}
