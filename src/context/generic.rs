use std::collections::VecDeque;

use crate::{
    config::Config,
    db::{
        atom::{AtomDB, AtomManager},
        ground_rule::GroundRuleDB,
        term::TermDB,
        AtomIndex, GroundRuleKey,
    },
    misc::log::targets::{self},
    procedures::lazy::RegroundTask,
    reasoner::OptimizationReport,
    reports::Report,
    structures::{
        atom::QueryAtom,
        constant::{Argument, Constant, ConstantType},
        formula::Formula,
        ground_rule::GroundRule,
        predicate::{PredicateId, Registry},
        rule::{ArithmeticExpression, Rule, RuleIndex},
    },
    types::err::{self, ErrorKind},
};

use super::{ContextState, Counters};

/// A generic context, parameratised to a source of randomness.
///
/// Requires a source of [rng](rand::Rng) which (also) implements [Default].
///
/// # Example
///
/// ```rust
/// # use otter_psl::context::GenericContext;
/// # use otter_psl::generic::random::SplitMix64;
/// # use otter_psl::config::Config;
/// let context = GenericContext::<SplitMix64>::from_config(Config::default());
/// ```
pub struct GenericContext<R: rand::Rng + std::default::Default> {
    /// The configuration of a context.
    pub config: Config,

    /// Counters related to grounding and inference.
    pub counters: Counters,

    /// The predicates of the context.
    pub registry: Registry,

    /// Rules, indexed by [RuleIndex].
    pub rules: Vec<Rule>,

    /// The atom database.
    /// See [db::atom](crate::db::atom) for details.
    pub atom_db: AtomDB,

    /// The ground rule database.
    /// See [db::ground_rule](crate::db::ground_rule) for details.
    pub ground_rule_db: GroundRuleDB,

    /// Terms built from the ground rule database.
    pub term_db: TermDB,

    /// Regrounding tasks, from the activation of atoms.
    pub work_queue: VecDeque<RegroundTask>,

    /// The status of the context.
    pub state: ContextState,

    /// The source of rng.
    pub rng: R,

    /// A count of rules which have been grounded, from the first rule.
    pub(crate) grounded_rules: usize,

    /// The report of the most recent optimization.
    pub(crate) last_optimization: Option<OptimizationReport>,
}

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// A report on the state of the context.
    pub fn report(&self) -> Report {
        match (&self.state, &self.last_optimization) {
            (ContextState::Optimized, Some(optimization)) => optimization.report,
            _ => Report::Unknown,
        }
    }

    /// The report of the most recent optimization, if any.
    pub fn last_optimization(&self) -> Option<&OptimizationReport> {
        self.last_optimization.as_ref()
    }

    fn note_input(&mut self) {
        if self.state == ContextState::Configuration {
            self.state = ContextState::Input;
        }
    }

    /// Registers a standard predicate, open unless `closed`.
    pub fn add_predicate(
        &mut self,
        name: &str,
        argument_types: &[ConstantType],
        closed: bool,
    ) -> Result<PredicateId, ErrorKind> {
        let id = self.registry.add_predicate(name, argument_types, closed)?;
        self.note_input();
        Ok(id)
    }

    /// An atom of the predicate, for use in a formula.
    pub fn atom(
        &self,
        predicate: PredicateId,
        arguments: Vec<Argument>,
    ) -> Result<QueryAtom, ErrorKind> {
        Ok(self.registry.atom(predicate, arguments)?)
    }

    /// Adds an observed atom, or updates the value of an observed atom.
    pub fn observe(
        &mut self,
        predicate: PredicateId,
        arguments: Vec<Constant>,
        value: f32,
    ) -> Result<AtomIndex, ErrorKind> {
        let atom = self
            .atom_db
            .observe(&self.registry, predicate, arguments, value)?;
        self.note_input();
        Ok(atom)
    }

    /// Adds a random variable atom, with an initial value.
    pub fn target(
        &mut self,
        predicate: PredicateId,
        arguments: Vec<Constant>,
        value: f32,
    ) -> Result<AtomIndex, ErrorKind> {
        let atom = self
            .atom_db
            .target(&self.registry, predicate, arguments, value)?;
        self.note_input();
        Ok(atom)
    }

    /// The value of an atom, if stored.
    pub fn value_of(&self, predicate: PredicateId, arguments: &[Constant]) -> Option<f32> {
        self.atom_db.value_of(predicate, arguments)
    }

    /// Adds a rule, which is grounded on the next call to [ground](GenericContext::ground) or inference.
    pub fn add_rule(&mut self, rule: Rule) -> RuleIndex {
        let index = self.rules.len() as RuleIndex;
        log::info!(target: targets::GROUNDING, "Rule {index} added: {:?}", rule.query());
        self.rules.push(rule);
        self.note_input();
        index
    }

    /// Adds a logical rule, weighted if some weight is given, and a constraint otherwise.
    pub fn add_logical_rule(
        &mut self,
        formula: Formula,
        weight: Option<f64>,
        squared: bool,
    ) -> Result<RuleIndex, ErrorKind> {
        let rule = Rule::logical(&self.registry, formula, weight, squared)?;
        Ok(self.add_rule(rule))
    }

    /// Adds an arithmetic rule, weighted if some weight is given, and a constraint otherwise.
    pub fn add_arithmetic_rule(
        &mut self,
        expression: ArithmeticExpression,
        weight: Option<f64>,
        squared: bool,
    ) -> Result<RuleIndex, ErrorKind> {
        let rule = Rule::arithmetic(&self.registry, expression, weight, squared)?;
        Ok(self.add_rule(rule))
    }

    /// Removes a ground rule, and unregisters the ground rule from each of its atoms.
    ///
    /// Terms are regenerated on the next call to inference.
    pub fn remove_ground_rule(&mut self, key: GroundRuleKey) -> Result<GroundRule, ErrorKind> {
        let rule = self.ground_rule_db.remove(key)?;
        for atom in rule.atoms() {
            self.atom_db.unregister_ground_rule(atom, key);
        }
        Ok(rule)
    }

    /// The ground rule with the given key.
    pub fn ground_rule(&self, key: GroundRuleKey) -> Result<&GroundRule, ErrorKind> {
        Ok(self.ground_rule_db.get(key)?)
    }

    /// The rule at the given index.
    pub fn rule(&self, index: RuleIndex) -> Result<&Rule, ErrorKind> {
        match self.rules.get(index as usize) {
            Some(rule) => Ok(rule),
            None => Err(err::ErrorKind::InvalidState),
        }
    }
}
