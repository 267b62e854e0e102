//! Databases for holding information relevant to inference.
//!
//! - [The atom database](crate::db::atom)
//!   + Ground atoms, indexed by [AtomIndex], together with a shared array of values.
//!   + The [AtomManager](atom::AtomManager) interface through which grounding resolves atoms and issues queries.
//! - [The ground rule database](crate::db::ground_rule)
//!   + Ground rules, keyed by [GroundRuleKey], and deduplicated.
//! - [The term database](crate::db::term)
//!   + The numeric form of each ground rule, as used by a reasoner.

pub mod atom;
pub mod ground_rule;
mod keys;
pub use keys::*;
pub mod term;
