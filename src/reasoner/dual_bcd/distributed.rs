/*!
Dual block coordinate descent over contiguous blocks of terms.

Each sweep updates every term once, with blocks of terms handed to the [worker pool](crate::generic::parallel::Parallel::count).
There is no synchronisation between blocks within a sweep, and so a step may be computed from the state of a variable which another block updates before the step is applied.
Each variable is behind its own lock, so a single update is never lost, though the dual objective need not increase at every sweep.

Primal values are recovered, and the stopping criteria checked over all terms, every compute period.
*/

use std::sync::Mutex;

use crate::{
    config::Config,
    db::term::TermDB,
    generic::{numeric, parallel::Parallel},
    misc::log::targets::{self},
    reasoner::{
        dual_bcd::{
            atom::{DualAtom, Locked},
            check, recover_primal, DualTerm, Stopping,
        },
        summarise, OptimizationReport, Reasoner,
    },
    types::err::ErrorKind,
};

/// The distributed dual BCD reasoner.
pub struct DistributedDualBCDReasoner {
    stopping: Stopping,
    pool: Parallel,
}

impl DistributedDualBCDReasoner {
    pub fn new(config: &Config) -> Self {
        DistributedDualBCDReasoner {
            stopping: Stopping {
                config: config.dual_bcd.clone(),
                stopping: config.stopping.clone(),
            },
            pool: config.pool(),
        }
    }
}

impl Reasoner for DistributedDualBCDReasoner {
    fn optimize(&mut self, terms: &TermDB, values: &mut [f32]) -> Result<OptimizationReport, ErrorKind> {
        let regularization = self.stopping.config.regularization.value;
        let constraint_tolerance = self.stopping.stopping.constraint_tolerance.value;
        let period = self.stopping.config.compute_period.value.max(1);

        let variables = terms.variables();

        let mut dual_terms = Vec::with_capacity(terms.len());
        for term in terms.iter() {
            let positions = term
                .atoms
                .iter()
                .map(|atom| variables.binary_search(atom))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| ErrorKind::InvalidState)?;
            dual_terms.push(DualTerm::new(term, positions));
        }

        let block_size = self.pool.block_size(dual_terms.len(), 4);
        let blocks = dual_terms
            .chunks(block_size)
            .map(|block| Mutex::new(block.to_vec()))
            .collect::<Vec<_>>();
        let atoms = (0..variables.len())
            .map(|_| Mutex::new(DualAtom::default()))
            .collect::<Vec<_>>();

        log::info!(target: targets::DUAL_BCD, "Optimising {} terms in {} blocks", dual_terms.len(), blocks.len());

        let mut primal = vec![0.0_f32; variables.len()];
        let mut previous = None;
        let mut iteration = 1;

        let report = loop {
            self.pool.count(blocks.len(), |index| {
                let mut block = blocks[index].lock().unwrap_or_else(|poison| poison.into_inner());
                let mut store = Locked(&atoms);
                for term in block.iter_mut() {
                    term.block_update(&mut store, regularization);
                }
            });

            if (iteration - 1) % period == 0 {
                let store = Locked(&atoms);
                let movement = recover_primal(&store, &mut primal, regularization);

                let snapshot = blocks
                    .iter()
                    .flat_map(|block| block.lock().unwrap_or_else(|poison| poison.into_inner()).clone())
                    .collect::<Vec<_>>();
                let check = check(&snapshot, &store, &primal, regularization, constraint_tolerance as f64, movement);

                log::debug!(target: targets::DUAL_BCD, "Iteration {iteration}: {check:?}, gap {}", check.primal - check.dual);

                if let Some(report) = self.stopping.stop(iteration, &check, previous.as_ref()) {
                    break report;
                }
                previous = Some(check);
            }

            iteration += 1;
        };

        for (atom, value) in variables.iter().zip(&primal) {
            values[*atom as usize] = numeric::clamp_unit(*value);
        }

        log::info!(target: targets::DUAL_BCD, "{report} after {iteration} iterations");
        Ok(summarise(terms, values, iteration, report, constraint_tolerance))
    }
}

#[cfg(test)]
mod distributed_tests {
    use super::*;
    use crate::{
        db::{
            term::{Term, TermKind},
            GroundRuleKey,
        },
        reasoner::dual_bcd::DualBCDReasoner,
        reports::Report,
    };

    #[test]
    fn agrees_with_components() {
        let term = |kind, weight, coefficients: Vec<f32>, atoms: Vec<u32>, constant| Term {
            kind,
            weight,
            coefficients,
            atoms,
            constant,
            ground_rule: GroundRuleKey::default(),
        };

        // Two disjoint chains of implications, with priors at either end.
        let terms = TermDB::new(vec![
            term(TermKind::Hinge, 2.0, vec![-1.0], vec![0], -1.0),
            term(TermKind::Hinge, 1.0, vec![1.0, -1.0], vec![0, 1], 0.0),
            term(TermKind::Hinge, 1.0, vec![1.0, -1.0], vec![1, 2], 0.0),
            term(TermKind::Linear, 0.5, vec![1.0], vec![2], 0.0),
            term(TermKind::SquaredHinge, 1.0, vec![1.0, -1.0], vec![3, 4], 0.0),
            term(TermKind::Linear, 0.5, vec![1.0], vec![4], 0.0),
        ]);

        let mut config = Config::default();
        config.threads.value = 3;

        let mut component_values = vec![0.0; 5];
        let component = DualBCDReasoner::new(&config)
            .optimize(&terms, &mut component_values)
            .unwrap();

        let mut distributed_values = vec![0.0; 5];
        let distributed = DistributedDualBCDReasoner::new(&config)
            .optimize(&terms, &mut distributed_values)
            .unwrap();

        assert_eq!(component.report, Report::Converged);
        assert_eq!(distributed.report, Report::Converged);
        assert!(numeric::equals(component.objective, distributed.objective, 0.05));
    }
}
