//! Atoms as they appear in formulas, i.e. a predicate applied to arguments which may be variables.
//!
//! A ground atom, stored in the [atom database](crate::db::atom), is a predicate applied to constants.
//! The link between the two is substitution, in one direction, and tracing, in the other.

use std::collections::BTreeMap;

use crate::{
    structures::{
        constant::{Argument, Constant, Variable},
        predicate::PredicateId,
    },
    types::err::GroundingError,
};

/// A mapping from variables to constants.
pub type Substitution = BTreeMap<Variable, Constant>;

/// A predicate applied to arguments.
///
/// Built through a [Registry](crate::structures::predicate::Registry), which checks the arguments against the signature of the predicate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryAtom {
    pub predicate: PredicateId,
    pub arguments: Vec<Argument>,
}

impl QueryAtom {
    /// The variables of the atom, in order of (possibly repeated) occurrence.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.arguments.iter().filter_map(|argument| match argument {
            Argument::Variable(v) => Some(v),
            Argument::Constant(_) => None,
        })
    }

    pub fn is_ground(&self) -> bool {
        self.variables().next().is_none()
    }

    /// The arguments of the atom, with each variable replaced by its substitution.
    pub fn ground(&self, substitution: &Substitution) -> Result<Vec<Constant>, GroundingError> {
        self.arguments
            .iter()
            .map(|argument| match argument {
                Argument::Constant(c) => Ok(c.clone()),
                Argument::Variable(v) => match substitution.get(v) {
                    Some(c) => Ok(c.clone()),
                    None => Err(GroundingError::UnboundVariable(v.name().to_string())),
                },
            })
            .collect()
    }

    /// The substitution which grounds the atom to the given arguments, if any.
    ///
    /// Constants of the atom must match the arguments, and repeated variables must be given the same constant.
    pub fn trace(&self, arguments: &[Constant]) -> Option<Substitution> {
        if arguments.len() != self.arguments.len() {
            return None;
        }

        let mut substitution = Substitution::default();
        for (argument, constant) in self.arguments.iter().zip(arguments) {
            match argument {
                Argument::Constant(c) => {
                    if c != constant {
                        return None;
                    }
                }
                Argument::Variable(v) => match substitution.get(v) {
                    Some(existing) if existing != constant => return None,
                    Some(_) => {}
                    None => {
                        substitution.insert(v.clone(), constant.clone());
                    }
                },
            }
        }

        Some(substitution)
    }
}

#[cfg(test)]
mod atom_tests {
    use super::*;

    fn atom(arguments: Vec<Argument>) -> QueryAtom {
        QueryAtom {
            predicate: 7,
            arguments,
        }
    }

    #[test]
    fn trace_binds_variables() {
        let friends = atom(vec![Argument::var("A"), Argument::var("B")]);
        let traced = friends
            .trace(&[Constant::from("alice"), Constant::from("bob")])
            .unwrap();

        assert_eq!(traced.get(&Variable::new("A")), Some(&Constant::from("alice")));
        assert_eq!(friends.ground(&traced).unwrap()[1], Constant::from("bob"));
    }

    #[test]
    fn trace_respects_constants_and_repeats() {
        let knows_self = atom(vec![Argument::var("A"), Argument::var("A")]);
        assert!(knows_self
            .trace(&[Constant::from("alice"), Constant::from("bob")])
            .is_none());
        assert!(knows_self
            .trace(&[Constant::from("alice"), Constant::from("alice")])
            .is_some());

        let knows_alice = atom(vec![Argument::var("A"), Argument::constant("alice")]);
        assert!(knows_alice
            .trace(&[Constant::from("bob"), Constant::from("carol")])
            .is_none());
    }

    #[test]
    fn unbound_grounding() {
        let friends = atom(vec![Argument::var("A"), Argument::var("B")]);
        let mut substitution = Substitution::default();
        substitution.insert(Variable::new("A"), Constant::from("alice"));

        assert_eq!(
            friends.ground(&substitution),
            Err(GroundingError::UnboundVariable("B".to_string()))
        );
    }
}
