/*!
Grounding of rules.

For each rule:
1. The query of the rule is executed against an [atom manager](AtomManager).
2. For each row of the result, each literal of the rule is grounded by the substitution of the row, and each ground atom is resolved to an index through the atom manager.
3. The ground rule is kept, and stored, unless:
   - The ground rule is a logical rule whose *worst case* is no greater than the tautology epsilon.
     That is, no assignment of values to random variables could lead to a violation.
   - The ground rule is weighted, and has no random variable atoms.
   - An identical ground rule is stored.

Queries are read-only, and so the queries of distinct rules are executed in parallel, unless configured to be serial.
Rules with the same query share the result of a single execution.
Instantiation is sequential, as atoms may be created and ground rules are stored.

# Example

```rust
# use otter_psl::config::Config;
# use otter_psl::context::Context;
# use otter_psl::structures::constant::{Argument, ConstantType};
# use otter_psl::structures::formula::Formula;
let mut ctx = Context::from_config(Config::default());
let friends = ctx.add_predicate("Friends", &[ConstantType::Text, ConstantType::Text], false).unwrap();

for (a, b) in [("a", "b"), ("b", "a"), ("a", "c")] {
    ctx.target(friends, vec![a.into(), b.into()], 0.5).unwrap();
}

let fab = ctx.atom(friends, vec![Argument::var("A"), Argument::var("B")]).unwrap();
let fba = ctx.atom(friends, vec![Argument::var("B"), Argument::var("A")]).unwrap();

// A tautology grounds to nothing.
ctx.add_logical_rule(Formula::implies(fab.clone().into(), fab.clone().into()), Some(1.0), false).unwrap();
// Symmetry, over three atoms, with a lazily created Friends(c, a).
ctx.add_logical_rule(Formula::implies(fab.into(), fba.into()), Some(1.0), false).unwrap();

let summary = ctx.ground().unwrap();
assert_eq!(summary.rows, 6);
assert_eq!(summary.added, 3);
assert_eq!(summary.pruned, 3);
assert_eq!(ctx.atom_db.lazy_atoms().count(), 1);
```
*/

use crate::{
    config::grounding::GroundingConfig,
    context::{ContextState, GenericContext},
    db::{
        atom::{
            query::{Query, ResultRelation},
            AtomManager,
        },
        ground_rule::{GroundRuleDB, GroundRuleOk},
        AtomIndex,
    },
    generic::parallel::Parallel,
    misc::log::targets::{self},
    structures::{
        atom::Substitution,
        comparator::Comparator,
        formula::Formula,
        ground_rule::{GroundRule, GroundRuleKind},
        predicate::Registry,
        rule::{Rule, RuleBody, RuleIndex},
    },
    types::err::ErrorKind,
};

/// Counts from some grounding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroundingSummary {
    /// Rows returned by queries.
    pub rows: usize,

    /// Ground rules stored.
    pub added: usize,

    /// Ground rules discarded, as the ground rule could never be violated or was constant.
    pub pruned: usize,

    /// Ground rules identical to some stored ground rule.
    pub duplicates: usize,
}

impl std::ops::AddAssign for GroundingSummary {
    fn add_assign(&mut self, other: Self) {
        self.rows += other.rows;
        self.added += other.added;
        self.pruned += other.pruned;
        self.duplicates += other.duplicates;
    }
}

/// Grounds each of the given rules, and stores the ground rules.
pub fn ground_all<M: AtomManager + Sync>(
    manager: &mut M,
    registry: &Registry,
    rules: &[(RuleIndex, &Rule)],
    store: &mut GroundRuleDB,
    config: &GroundingConfig,
    pool: &Parallel,
) -> Result<GroundingSummary, ErrorKind> {
    let mut queries: Vec<&Formula> = Vec::default();
    let mut query_of_rule: Vec<usize> = Vec::with_capacity(rules.len());
    for (_, rule) in rules {
        match queries.iter().position(|query| *query == rule.query()) {
            Some(index) => query_of_rule.push(index),
            None => {
                query_of_rule.push(queries.len());
                queries.push(rule.query());
            }
        }
    }

    log::info!(target: targets::GROUNDING, "Grounding {} rules with {} distinct queries", rules.len(), queries.len());

    let results: Vec<Result<ResultRelation, ErrorKind>> = {
        let shared: &M = manager;
        let execute = |index: usize| shared.execute_query(registry, &Query::new(queries[index].clone()));

        match config.serial.value {
            true => (0..queries.len()).map(execute).collect(),
            false => pool.map(queries.len(), execute),
        }
    };
    let results = results.into_iter().collect::<Result<Vec<_>, _>>()?;

    let mut summary = GroundingSummary::default();
    for ((index, rule), query) in rules.iter().zip(query_of_rule) {
        let result = &results[query];
        log::debug!(target: targets::GROUNDING, "Rule {index} has {} substitutions", result.len());

        for row in 0..result.len() {
            let substitution = result.substitution(row);
            summary += ground_substitution(
                manager,
                registry,
                *index,
                rule,
                &substitution,
                store,
                config.tautology_epsilon.value,
            )?;
        }
    }

    log::info!(target: targets::GROUNDING, "Grounding complete: {summary:?}");
    Ok(summary)
}

/// Grounds a rule by a substitution, and stores the ground rule(s) unless discarded.
pub fn ground_substitution<M: AtomManager>(
    manager: &mut M,
    registry: &Registry,
    index: RuleIndex,
    rule: &Rule,
    substitution: &Substitution,
    store: &mut GroundRuleDB,
    tautology_epsilon: f64,
) -> Result<GroundingSummary, ErrorKind> {
    let mut summary = GroundingSummary {
        rows: 1,
        ..Default::default()
    };

    let ground_rules = instantiate(manager, registry, index, rule, substitution)?;

    for ground_rule in ground_rules {
        let is_random_variable = |atom: AtomIndex| manager.is_random_variable(atom);

        if ground_rule.logical {
            let worst = ground_rule.worst_case(manager.values(), is_random_variable);
            if worst <= tautology_epsilon {
                log::trace!(target: targets::GROUNDING, "Pruned ground rule of {index} with worst case {worst}");
                summary.pruned += 1;
                continue;
            }
        }

        if !ground_rule.is_constraint() && ground_rule.is_constant(is_random_variable) {
            log::trace!(target: targets::GROUNDING, "Pruned constant ground rule of {index}");
            summary.pruned += 1;
            continue;
        }

        match store.insert(ground_rule) {
            GroundRuleOk::Added(key) => {
                if let Ok(stored) = store.get(key) {
                    for atom in stored.atoms() {
                        manager.register_ground_rule(atom, key);
                    }
                }
                summary.added += 1;
            }
            GroundRuleOk::Duplicate(_) => summary.duplicates += 1,
        }
    }

    Ok(summary)
}

/// The ground rules of a rule under a substitution.
///
/// A weighted arithmetic equality grounds to a pair of rules, otherwise a single ground rule is returned.
fn instantiate<M: AtomManager>(
    manager: &mut M,
    registry: &Registry,
    index: RuleIndex,
    rule: &Rule,
    substitution: &Substitution,
) -> Result<Vec<GroundRule>, ErrorKind> {
    let mut resolve = |atom: &crate::structures::atom::QueryAtom| -> Result<AtomIndex, ErrorKind> {
        let arguments = atom.ground(substitution)?;
        manager.get_atom(registry, atom.predicate, &arguments)
    };

    match &rule.body {
        RuleBody::Logical { clause, .. } => {
            let positive = clause
                .positive()
                .iter()
                .map(&mut resolve)
                .collect::<Result<Vec<_>, _>>()?;
            let negative = clause
                .negative()
                .iter()
                .map(&mut resolve)
                .collect::<Result<Vec<_>, _>>()?;

            let kind = match rule.weight {
                Some(weight) => GroundRuleKind::Weighted {
                    weight,
                    squared: rule.squared,
                },
                None => GroundRuleKind::Constraint(Comparator::LessThanEqual),
            };

            Ok(vec![GroundRule::logical(index, kind, &positive, &negative)])
        }

        RuleBody::Arithmetic(expression) => {
            let mut literals = Vec::with_capacity(expression.terms.len());
            for (coefficient, atom) in &expression.terms {
                literals.push((*coefficient, resolve(atom)?));
            }

            let negated = || {
                literals
                    .iter()
                    .map(|(coefficient, atom)| (-coefficient, *atom))
                    .collect::<Vec<_>>()
            };

            let bound = expression.constant;
            let ground_rules = match rule.weight {
                None => vec![GroundRule::arithmetic(
                    index,
                    GroundRuleKind::Constraint(expression.comparator),
                    literals.clone(),
                    bound,
                )],

                Some(weight) => {
                    let kind = GroundRuleKind::Weighted {
                        weight,
                        squared: rule.squared,
                    };
                    match expression.comparator {
                        Comparator::LessThanEqual => {
                            vec![GroundRule::arithmetic(index, kind, literals.clone(), bound)]
                        }
                        Comparator::GreaterThanEqual => {
                            vec![GroundRule::arithmetic(index, kind, negated(), -bound)]
                        }
                        Comparator::Equal => vec![
                            GroundRule::arithmetic(index, kind, literals.clone(), bound),
                            GroundRule::arithmetic(index, kind, negated(), -bound),
                        ],
                    }
                }
            };

            Ok(ground_rules)
        }
    }
}

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Grounds each rule added since the last call to ground.
    pub fn ground(&mut self) -> Result<GroundingSummary, ErrorKind> {
        let pool = self.config.pool();

        let fresh = self
            .rules
            .iter()
            .enumerate()
            .skip(self.grounded_rules)
            .map(|(index, rule)| (index as RuleIndex, rule))
            .collect::<Vec<_>>();

        let summary = ground_all(
            &mut self.atom_db,
            &self.registry,
            &fresh,
            &mut self.ground_rule_db,
            &self.config.grounding,
            &pool,
        )?;

        self.grounded_rules = self.rules.len();
        self.note_grounding(&summary);
        if self.state < ContextState::Grounded {
            self.state = ContextState::Grounded;
        }

        Ok(summary)
    }

    pub(crate) fn note_grounding(&mut self, summary: &GroundingSummary) {
        self.counters.groundings += summary.rows;
        self.counters.ground_rules_added += summary.added;
        self.counters.ground_rules_pruned += summary.pruned;
        self.counters.ground_rules_duplicate += summary.duplicates;
    }
}
