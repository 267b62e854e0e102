/*!
Incremental grounding, on the activation of atoms.

Random variable atoms created during grounding are not persisted, and so are not matched by queries.
After inference, any such atom with a value of at least the [activation threshold](crate::config::grounding::LazyConfig::activation_threshold) is *activated*, i.e. persisted.

Activation of an atom may lead to new ground rules, as the atom may now match a positive literal of a rule.
For each logical rule which depends on the predicate of an activated atom, and each way in which the atom matches a positive literal of the rule, a [RegroundTask] is added to the work queue of the context.
Processing a task executes the query of the rule with the variables of the match bound, and grounds the rule for each row of the result.

Repeated rows across tasks lead to duplicate ground rules, which are dropped by the ground rule database.

Arithmetic rules are not regrounded.
*/

use crate::{
    context::GenericContext,
    db::{
        atom::{query::Query, AtomManager},
        AtomIndex,
    },
    misc::log::targets::{self},
    procedures::ground::{ground_substitution, GroundingSummary},
    reports::Report,
    structures::{atom::Substitution, rule::RuleIndex},
    types::err::ErrorKind,
};

/// A rule to reground, with some variables bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegroundTask {
    pub rule: RuleIndex,
    pub assignment: Substitution,
}

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Activates each lazily created atom with a value of at least the activation threshold, and queues regrounding tasks for each.
    ///
    /// Returns the activated atoms.
    pub fn activate_atoms(&mut self) -> Vec<AtomIndex> {
        let threshold = self.config.lazy.activation_threshold.value;
        let activated = self.atom_db.activate(threshold);

        for atom in &activated {
            let ground_atom = self.atom_db.atom(*atom);

            for (index, rule) in self.rules.iter().enumerate().take(self.grounded_rules) {
                let Some(clause) = rule.clause() else {
                    continue;
                };
                for assignment in clause.trace_atom_event(ground_atom.predicate, &ground_atom.arguments) {
                    log::trace!(target: targets::LAZY, "Reground {index} with {assignment:?}");
                    self.work_queue.push_back(RegroundTask {
                        rule: index as RuleIndex,
                        assignment,
                    });
                }
            }
        }

        self.counters.activated_atoms += activated.len();
        log::info!(target: targets::LAZY, "Activated {} atoms, with {} tasks queued", activated.len(), self.work_queue.len());

        activated
    }

    /// Processes each task on the work queue.
    pub fn process_work_queue(&mut self) -> Result<GroundingSummary, ErrorKind> {
        let epsilon = self.config.grounding.tautology_epsilon.value;
        let mut summary = GroundingSummary::default();

        while let Some(task) = self.work_queue.pop_front() {
            let Some(rule) = self.rules.get(task.rule as usize) else {
                return Err(ErrorKind::InvalidState);
            };

            let query = Query::with_bindings(rule.query().clone(), task.assignment);
            let result = self.atom_db.execute_query(&self.registry, &query)?;

            for row in 0..result.len() {
                let substitution = result.substitution(row);
                summary += ground_substitution(
                    &mut self.atom_db,
                    &self.registry,
                    task.rule,
                    rule,
                    &substitution,
                    &mut self.ground_rule_db,
                    epsilon,
                )?;
            }
        }

        log::info!(target: targets::LAZY, "Regrounding complete: {summary:?}");
        self.note_grounding(&summary);
        Ok(summary)
    }

    /// Alternates inference with activation and regrounding, until no atom is activated or the maximum number of rounds is reached.
    ///
    /// Returns the report of the final round of inference.
    pub fn infer_lazily(&mut self) -> Result<Report, ErrorKind> {
        let max_rounds = self.config.lazy.max_rounds.value;

        let mut report = self.infer()?;
        for round in 1..max_rounds {
            if self.activate_atoms().is_empty() {
                break;
            }

            self.process_work_queue()?;
            self.counters.lazy_rounds += 1;
            log::debug!(target: targets::LAZY, "Round {round}");

            report = self.infer()?;
        }

        Ok(report)
    }
}
