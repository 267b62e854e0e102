//! Structures used to build a model, and the ground structures derived from a model.
//!
//! - [Constants](constant), [predicates](predicate), and [atoms](atom) over predicates.
//! - [Formulas](formula) of atoms, and the analysis of their [disjunctive normal form](dnf).
//! - [Rules](rule), and [ground rules](ground_rule).

pub mod atom;
pub mod comparator;
pub mod constant;
pub mod dnf;
pub mod formula;
pub mod ground_rule;
pub mod predicate;
pub mod rule;
