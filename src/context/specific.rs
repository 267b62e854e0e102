use std::collections::VecDeque;

use crate::{
    config::Config,
    db::{atom::AtomDB, ground_rule::GroundRuleDB, term::TermDB},
    generic::random::SplitMix64,
    structures::predicate::Registry,
};

use rand::SeedableRng;

use super::{ContextState, Counters, GenericContext};

/// A context which uses [SplitMix64] as a source of randomness.
pub type Context = GenericContext<SplitMix64>;

impl Context {
    /// Creates a context from some given configuration.
    pub fn from_config(config: Config) -> Self {
        Self {
            rng: SplitMix64::seed_from_u64(config.seed.value),

            config,

            counters: Counters::default(),
            registry: Registry::default(),
            rules: Vec::default(),

            atom_db: AtomDB::default(),
            ground_rule_db: GroundRuleDB::default(),
            term_db: TermDB::default(),
            work_queue: VecDeque::default(),

            state: ContextState::Configuration,

            grounded_rules: 0,
            last_optimization: None,
        }
    }
}
