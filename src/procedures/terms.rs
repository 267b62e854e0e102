/*!
Generation of terms from ground rules.

Each ground rule is turned into a [hyperplane] over the random variable atoms of the ground rule:
- The value of each fixed atom is folded into the constant.
- Coefficients of a repeated random variable atom are summed, and the atom is dropped if the sum is zero.

A ground rule has no term if:
- No random variable atom remains, in which case a violated constraint is noted with a warning.
- The ground rule is a weighted logical rule, and some random variable atom appears both positively and negatively.
  Here, the potential of the ground rule is constant on the box, as the rule is always satisfied.
- The weight of the ground rule is negative.

# Example

```rust
# use otter_psl::db::{atom::AtomDB, GroundRuleKey};
# use otter_psl::db::term::TermKind;
# use otter_psl::procedures::terms::hyperplane;
# use otter_psl::structures::ground_rule::{GroundRule, GroundRuleKind};
let atoms = AtomDB::default();
let kind = GroundRuleKind::Weighted { weight: 1.0, squared: false };

// With no atoms, no term.
let rule = GroundRule::logical(0, kind, &[], &[]);
assert!(hyperplane(GroundRuleKey::default(), &rule, &atoms, 0.0).is_err());
```
*/

use crate::{
    context::GenericContext,
    db::{
        atom::AtomManager,
        term::{Term, TermDB, TermKind},
        AtomIndex, GroundRuleKey,
    },
    misc::log::targets::{self},
    structures::ground_rule::{GroundRule, GroundRuleKind},
};

/// Reasons for which a ground rule has no term.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermDrop {
    /// The potential of the ground rule is constant on the box.
    Trivial,

    /// No random variable atom remains.
    Constant { violated: bool },

    /// The weight of the ground rule is negative.
    NegativeWeight,
}

/// The term of a ground rule, or the reason the ground rule has no term.
///
/// `constraint_tolerance` is used only to note whether a constant constraint is violated.
pub fn hyperplane(
    key: GroundRuleKey,
    ground_rule: &GroundRule,
    manager: &impl AtomManager,
    constraint_tolerance: f64,
) -> Result<Term, TermDrop> {
    if let Some(weight) = ground_rule.weight() {
        if weight < 0.0 {
            return Err(TermDrop::NegativeWeight);
        }
    }

    let mut constant = -ground_rule.constant;
    let mut merged: Vec<(AtomIndex, f64)> = Vec::with_capacity(ground_rule.literals.len());

    for (coefficient, atom) in &ground_rule.literals {
        if !manager.is_random_variable(*atom) {
            constant -= coefficient * manager.value(*atom) as f64;
            continue;
        }

        match merged.iter_mut().find(|(a, _)| a == atom) {
            Some((_, existing)) => {
                if ground_rule.logical
                    && !ground_rule.is_constraint()
                    && existing.signum() != coefficient.signum()
                {
                    return Err(TermDrop::Trivial);
                }
                *existing += coefficient;
            }
            None => merged.push((*atom, *coefficient)),
        }
    }

    merged.retain(|(_, coefficient)| *coefficient != 0.0);

    if merged.is_empty() {
        let violated = match ground_rule.kind {
            GroundRuleKind::Constraint(comparator) => {
                comparator.violation(-constant) > constraint_tolerance
            }
            GroundRuleKind::Weighted { .. } => false,
        };
        return Err(TermDrop::Constant { violated });
    }

    let (kind, weight) = match ground_rule.kind {
        GroundRuleKind::Constraint(comparator) => (TermKind::Constraint(comparator), 0.0),

        GroundRuleKind::Weighted { weight, squared } => {
            let kind = match squared {
                true => TermKind::SquaredHinge,
                false => {
                    let least = merged.iter().map(|(_, c)| c.min(0.0)).sum::<f64>() - constant;
                    match least >= 0.0 {
                        true => TermKind::Linear,
                        false => TermKind::Hinge,
                    }
                }
            };
            (kind, weight as f32)
        }
    };

    let (atoms, coefficients) = merged
        .into_iter()
        .map(|(atom, coefficient)| (atom, coefficient as f32))
        .unzip();

    Ok(Term {
        kind,
        weight,
        coefficients,
        atoms,
        constant: constant as f32,
        ground_rule: key,
    })
}

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Replaces the term database with terms built from each stored ground rule.
    pub fn generate_terms(&mut self) {
        let tolerance = self.config.stopping.constraint_tolerance.value as f64;

        let mut terms = Vec::with_capacity(self.ground_rule_db.len());
        let mut dropped = 0;

        for (key, ground_rule) in self.ground_rule_db.iter() {
            match hyperplane(key, ground_rule, &self.atom_db, tolerance) {
                Ok(term) => terms.push(term),

                Err(reason) => {
                    dropped += 1;
                    match reason {
                        TermDrop::Constant { violated: true } => {
                            log::warn!(target: targets::TERMS, "Violated constraint without random variables: {ground_rule:?}");
                        }
                        TermDrop::NegativeWeight => {
                            log::warn!(target: targets::TERMS, "Skipped ground rule with negative weight: {ground_rule:?}");
                        }
                        _ => {
                            log::trace!(target: targets::TERMS, "No term for {key:?}: {reason:?}");
                        }
                    }
                }
            }
        }

        log::info!(target: targets::TERMS, "Generated {} terms, with {dropped} ground rules dropped", terms.len());

        self.counters.terms = terms.len();
        self.counters.terms_dropped = dropped;
        self.term_db = TermDB::new(terms);
    }
}
