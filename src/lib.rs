//! A library for MAP inference over hinge-loss Markov random fields, as defined by weighted first-order rules over a partially observed database.
//!
//! # Orientation
//!
//! Inference is split into two phases.
//!
//! + *Grounding*. Each first-order [rule](structures::rule) is compiled into ground rules by issuing a query derived from the disjunctive normal form of the rule against an [atom manager](db::atom::AtomManager), and instantiating the rule for each row of the result.
//!   Instantiations which could never be violated are pruned, and the remaining ground rules are stored, deduplicated, in the [ground rule database](db::ground_rule).
//!
//! + *Inference*. Each ground rule is converted to a [term](db::term) --- a hyperplane together with a weight and a kind --- and a [reasoner](reasoner) assigns values to the random variable atoms of the database by optimising the sum of the terms.
//!
//! Both phases are driven from a [context](context), which owns a [registry](structures::predicate::Registry) of predicates, the rules added, and the databases.
//!
//! # Example
//!
//! ```rust
//! # use otter_psl::config::Config;
//! # use otter_psl::context::Context;
//! # use otter_psl::structures::constant::{Argument, Constant, ConstantType};
//! # use otter_psl::structures::formula::Formula;
//! let mut ctx = Context::from_config(Config::default());
//!
//! let friends = ctx.add_predicate("Friends", &[ConstantType::Text, ConstantType::Text], true).unwrap();
//! let smokes = ctx.add_predicate("Smokes", &[ConstantType::Text], false).unwrap();
//!
//! ctx.observe(friends, vec![Constant::from("alice"), Constant::from("bob")], 1.0).unwrap();
//! ctx.observe(smokes, vec![Constant::from("alice")], 1.0).unwrap();
//! ctx.target(smokes, vec![Constant::from("bob")], 0.0).unwrap();
//!
//! let body = Formula::and(vec![
//!     ctx.atom(friends, vec![Argument::var("A"), Argument::var("B")]).unwrap().into(),
//!     ctx.atom(smokes, vec![Argument::var("A")]).unwrap().into(),
//! ]);
//! let head = ctx.atom(smokes, vec![Argument::var("B")]).unwrap().into();
//!
//! assert!(ctx.add_logical_rule(Formula::implies(body, head), Some(1.0), true).is_ok());
//! assert!(ctx.infer().is_ok());
//!
//! let bob = ctx.value_of(smokes, &[Constant::from("bob")]).unwrap();
//! assert!(bob > 0.9);
//! ```
//!
//! # Design
//!
//! + Data is held in arenas and referenced by index.
//!   Atoms are indexed by [AtomIndex](db::AtomIndex), ground rules by [GroundRuleKey](db::GroundRuleKey), and terms refer to positions in the shared array of atom values rather than to atoms themselves.
//! + Behaviour is dispatched by matching on sum types, e.g. on the [kind](db::term::TermKind) of a term.
//! + Incremental grounding is driven by an explicit [work queue](procedures::lazy) of regrounding tasks, rather than by callbacks on atom events.
//! + Parallel work is fork-join over contiguous blocks, via a [count](generic::parallel::Parallel::count) primitive.
//!
//! # Logs
//!
//! Calls to [log!](log) are made throughout the library, with targets listed in [misc::log].
//!
//! For example, when used with [env_logger](https://docs.rs/env_logger/latest/env_logger/):
//! - Logs related to grounding can be filtered with `RUST_LOG=grounding …` or,
//! - Residuals of ADMM without per-term detail can be found with `RUST_LOG=admm=debug …`
//!

#![allow(clippy::single_match)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod context;
pub mod db;
pub mod generic;
pub mod misc;
pub mod procedures;
pub mod reasoner;
pub mod reports;
pub mod structures;
pub mod types;
