/*!
Local search for a boolean assignment of low loss.

Each block is set at random, and the unsatisfied weighted terms collected.
Then, on each flip:
1. A random unsatisfied term is chosen, and the free blocks of its variables become candidates.
2. With probability [noise](crate::config::reasoners::MaxWalkSatConfig::noise) a random candidate takes a random setting.
   Otherwise, each setting of each candidate is scored by the energy of the block, and the setting of least energy is taken, with the search stopping early on an energy of zero.
3. The unsatisfied terms incident to the block are updated.

The search stops when every weighted term is satisfied, or after the [maximum flips](crate::config::reasoners::MaxWalkSatConfig::max_flips).
The least loss assignment seen during the search is the one written.
*/

use rand::Rng;

use crate::{
    config::{reasoners::MaxWalkSatConfig, Config},
    db::term::TermDB,
    generic::{numeric, random::SplitMix64},
    misc::log::targets::{self},
    reasoner::{
        boolean::{is_unsatisfied, Blocks},
        summarise, OptimizationReport, Reasoner,
    },
    reports::Report,
    types::err::ErrorKind,
};

/// The set of unsatisfied terms, with constant time insertion and removal.
#[derive(Default)]
struct Unsatisfied {
    terms: Vec<usize>,

    /// The index of each term in `terms`, if present.
    slots: Vec<Option<usize>>,
}

impl Unsatisfied {
    fn new(term_count: usize) -> Self {
        Unsatisfied {
            terms: Vec::default(),
            slots: vec![None; term_count],
        }
    }

    fn set(&mut self, term: usize, unsatisfied: bool) {
        match (unsatisfied, self.slots[term]) {
            (true, None) => {
                self.slots[term] = Some(self.terms.len());
                self.terms.push(term);
            }

            (false, Some(slot)) => {
                self.terms.swap_remove(slot);
                if let Some(moved) = self.terms.get(slot) {
                    self.slots[*moved] = Some(slot);
                }
                self.slots[term] = None;
            }

            _ => {}
        }
    }

    fn random(&self, rng: &mut impl Rng) -> Option<usize> {
        match self.terms.is_empty() {
            true => None,
            false => Some(self.terms[rng.random_range(0..self.terms.len())]),
        }
    }
}

/// The MaxWalkSat reasoner.
pub struct MaxWalkSat {
    config: MaxWalkSatConfig,
    constraint_tolerance: f32,
    rng: SplitMix64,
}

impl MaxWalkSat {
    pub fn new(config: &Config, rng: SplitMix64) -> Self {
        MaxWalkSat {
            config: config.walksat.clone(),
            constraint_tolerance: config.stopping.constraint_tolerance.value,
            rng,
        }
    }
}

impl Reasoner for MaxWalkSat {
    fn optimize(&mut self, terms: &TermDB, values: &mut [f32]) -> Result<OptimizationReport, ErrorKind> {
        let blocks = Blocks::new(terms)?;
        let max_flips = self.config.max_flips.value;
        let noise = self.config.noise.value;

        let mut state = values.to_vec();
        blocks.randomise(&mut state, &mut self.rng);

        let mut unsatisfied = Unsatisfied::new(terms.len());
        for term in 0..terms.len() {
            unsatisfied.set(term, is_unsatisfied(terms, term, &state));
        }

        let mut loss = terms.objective(&state);
        let mut best_loss = loss;
        let mut best = state.clone();

        log::info!(target: targets::WALKSAT, "Searching over {} blocks, with {} unsatisfied terms", blocks.blocks.len(), unsatisfied.terms.len());

        let mut candidates = Vec::default();
        let mut flips = 0;

        while flips < max_flips {
            let Some(term) = unsatisfied.random(&mut self.rng) else {
                break;
            };
            flips += 1;

            candidates.clear();
            for atom in &terms.terms()[term].atoms {
                if let Some(block) = blocks.block_of(terms, *atom) {
                    if blocks.blocks[block].is_free() && !candidates.contains(&block) {
                        candidates.push(block);
                    }
                }
            }
            if candidates.is_empty() {
                continue;
            }

            let (block, setting) = match self.rng.random_bool(noise) {
                true => {
                    let block = candidates[self.rng.random_range(0..candidates.len())];
                    (block, blocks.blocks[block].random_setting(&mut self.rng))
                }

                false => {
                    let mut choice = (candidates[0], blocks.blocks[candidates[0]].setting(&state));
                    let mut least = f64::INFINITY;

                    'search: for candidate in &candidates {
                        let block = &blocks.blocks[*candidate];
                        let current = block.setting(&state);
                        for setting in block.settings() {
                            block.apply(setting, &mut state);
                            let energy = block.energy(terms, &state);
                            if energy < least {
                                least = energy;
                                choice = (*candidate, setting);
                            }
                            block.apply(current, &mut state);

                            if numeric::is_zero(least, numeric::EPSILON) {
                                break 'search;
                            }
                        }
                    }

                    choice
                }
            };

            let block = &blocks.blocks[block];
            let before = block.energy(terms, &state);
            block.apply(setting, &mut state);
            let after = block.energy(terms, &state);

            for term in &block.incident {
                unsatisfied.set(*term, is_unsatisfied(terms, *term, &state));
            }

            loss += after - before;
            log::trace!(target: targets::WALKSAT, "Flip {flips}: loss {loss}");

            if loss < best_loss {
                best_loss = loss;
                best.copy_from_slice(&state);
            }
        }

        for atom in terms.variables() {
            values[*atom as usize] = best[*atom as usize];
        }

        let report = match unsatisfied.terms.is_empty() {
            true => Report::Converged,
            false => Report::MaxIterations,
        };

        log::info!(target: targets::WALKSAT, "{report} after {flips} flips, with loss {best_loss}");
        Ok(summarise(terms, values, flips, report, self.constraint_tolerance))
    }
}

#[cfg(test)]
mod walksat_tests {
    use super::*;
    use crate::{
        db::{
            term::{Term, TermKind},
            GroundRuleKey,
        },
        structures::comparator::Comparator,
    };
    use rand::SeedableRng;

    fn term(kind: TermKind, weight: f32, coefficients: Vec<f32>, atoms: Vec<u32>, constant: f32) -> Term {
        Term {
            kind,
            weight,
            coefficients,
            atoms,
            constant,
            ground_rule: GroundRuleKey::default(),
        }
    }

    #[test]
    fn unsatisfied_set() {
        let mut unsatisfied = Unsatisfied::new(4);
        unsatisfied.set(1, true);
        unsatisfied.set(3, true);
        unsatisfied.set(2, true);
        unsatisfied.set(1, false);
        unsatisfied.set(0, false);

        assert_eq!(unsatisfied.terms.len(), 2);
        assert_eq!(unsatisfied.slots[2], Some(0));
        assert_eq!(unsatisfied.slots[3], Some(1));
        assert_eq!(unsatisfied.slots[1], None);
    }

    #[test]
    fn satisfiable() {
        // 0 → 1, 1 → 2, with 0 pulled up and exactly one of 2 and 3.
        let terms = TermDB::new(vec![
            term(TermKind::Hinge, 1.0, vec![-1.0], vec![0], -1.0),
            term(TermKind::Hinge, 1.0, vec![1.0, -1.0], vec![0, 1], 0.0),
            term(TermKind::Hinge, 1.0, vec![1.0, -1.0], vec![1, 2], 0.0),
            term(TermKind::Constraint(Comparator::Equal), 0.0, vec![1.0, 1.0], vec![2, 3], 1.0),
        ]);

        let mut values = vec![0.0; 4];
        let mut walksat = MaxWalkSat::new(&Config::default(), SplitMix64::seed_from_u64(7));
        let report = walksat.optimize(&terms, &mut values).unwrap();

        assert_eq!(report.report, Report::Converged);
        assert_eq!(report.objective, 0.0);
        assert_eq!(report.violated_constraints, 0);
        assert_eq!(values, vec![1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn conflict_keeps_heavier() {
        let terms = TermDB::new(vec![
            term(TermKind::Hinge, 3.0, vec![-1.0], vec![0], -1.0),
            term(TermKind::Hinge, 1.0, vec![1.0], vec![0], 0.0),
        ]);

        let mut config = Config::default();
        config.walksat.max_flips.value = 200;

        let mut values = vec![0.0];
        let mut walksat = MaxWalkSat::new(&config, SplitMix64::seed_from_u64(0));
        let report = walksat.optimize(&terms, &mut values).unwrap();

        assert_eq!(report.report, Report::MaxIterations);
        assert_eq!(values, vec![1.0]);
        assert_eq!(report.objective, 1.0);
    }
}
