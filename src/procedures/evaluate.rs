/*!
Evaluation of ground rules under the current values of atoms.

These are read-only summaries of the ground rule database, and are independent of any [term](crate::db::term) generated from it.

The *expected* incompatibility of a ground rule treats the value of each random variable atom as the probability the atom is true, with atoms independent, and is the expectation of the incompatibility of the ground rule over the boolean assignments of its random variables.
This is computed by enumeration, and so is exponential in the count of distinct random variable atoms of the ground rule.
*/

use crate::{
    context::GenericContext,
    db::{atom::AtomManager, AtomIndex, GroundRuleKey},
    structures::ground_rule::GroundRule,
    types::err::ErrorKind,
};

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// The sum of the weighted incompatibility of each weighted ground rule.
    pub fn total_weighted_incompatibility(&self) -> f64 {
        let values = self.atom_db.values();
        self.ground_rule_db
            .iter()
            .map(|(_, rule)| rule.weighted_incompatibility(values))
            .sum()
    }

    /// The sum of the weighted truth value of each weighted ground logical rule.
    pub fn total_weighted_compatibility(&self) -> f64 {
        let values = self.atom_db.values();
        self.ground_rule_db
            .iter()
            .filter(|(_, rule)| rule.logical)
            .filter_map(|(_, rule)| rule.weight().map(|w| w * rule.truth_value(values)))
            .sum()
    }

    /// The sum of the infeasibility of each constraint.
    pub fn total_infeasibility(&self) -> f64 {
        let values = self.atom_db.values();
        self.ground_rule_db
            .iter()
            .map(|(_, rule)| rule.infeasibility(values))
            .sum()
    }

    /// Keys of the constraints with an infeasibility greater than `tolerance`.
    pub fn violated_constraints(&self, tolerance: f64) -> Vec<GroundRuleKey> {
        let values = self.atom_db.values();
        self.ground_rule_db
            .iter()
            .filter(|(_, rule)| rule.infeasibility(values) > tolerance)
            .map(|(key, _)| key)
            .collect()
    }

    /// The expected incompatibility of the ground rule, unweighted.
    pub fn expected_incompatibility(&self, key: GroundRuleKey) -> Result<f64, ErrorKind> {
        let rule = self.ground_rule_db.get(key)?;
        Ok(expected_incompatibility(rule, &self.atom_db))
    }

    /// The sum of the weighted expected incompatibility of each weighted ground rule.
    pub fn total_expected_incompatibility(&self) -> f64 {
        self.ground_rule_db
            .iter()
            .filter_map(|(_, rule)| {
                rule.weight()
                    .map(|w| w * expected_incompatibility(rule, &self.atom_db))
            })
            .sum()
    }
}

/// The expected incompatibility of a ground rule, by enumeration of the boolean assignments to its random variable atoms.
pub fn expected_incompatibility(rule: &GroundRule, manager: &impl AtomManager) -> f64 {
    let mut variables: Vec<AtomIndex> = rule
        .atoms()
        .filter(|atom| manager.is_random_variable(*atom))
        .collect();
    variables.sort_unstable();
    variables.dedup();

    let mut expectation = 0.0;

    for setting in 0..(1_u64 << variables.len()) {
        let is_true = |position: usize| setting & (1 << position) != 0;

        let probability = variables
            .iter()
            .enumerate()
            .map(|(position, atom)| {
                let value = manager.value(*atom) as f64;
                match is_true(position) {
                    true => value,
                    false => 1.0 - value,
                }
            })
            .product::<f64>();

        if probability == 0.0 {
            continue;
        }

        let function = rule.function_with(|atom| match variables.binary_search(&atom) {
            Ok(position) => match is_true(position) {
                true => 1.0,
                false => 0.0,
            },
            Err(_) => manager.value(atom) as f64,
        });

        expectation += probability * rule.penalty(function);
    }

    expectation
}
