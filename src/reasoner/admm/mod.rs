/*!
Consensus optimisation by the alternating direction method of multipliers.

Each term holds a local copy `x` of its variables together with multipliers `y`, and each variable has a consensus value `z`.
An iteration is three sweeps:

1. *Local updates*, in parallel over blocks of terms.
   Each term updates its multipliers `y += ρ(x − z)` and minimises its loss plus `ρ/2‖x − (z − y/ρ)‖²` in closed form (see [minimize]).
2. *Consensus*, in parallel over blocks of variables.
   Each variable takes the average of `x + y/ρ` over its local copies, clipped to [0, 1].
3. *Residuals*, on every [compute period](crate::config::reasoners::ADMMConfig::compute_period).
   The primal residual is `‖x − z‖`, over local copies, and the dual residual is `ρ·sqrt(Σ count·(z_old − z_new)²)`, with `count` the number of local copies of a variable.

The reasoner stops when both residuals are within their tolerances:
- `ε_primal = sqrt(n)·ε_abs + ε_rel·max(‖x‖, ‖z‖)`
- `ε_dual = sqrt(n)·ε_abs + ε_rel·‖y‖`

Here, `n` is the count of local copies and `‖z‖` counts each variable once per local copy.

Local state is written only by its term, and consensus only by its variable, so sweeps need no locks.

# Example

```rust
# use otter_psl::config::Config;
# use otter_psl::db::{term::{Term, TermDB, TermKind}, GroundRuleKey};
# use otter_psl::generic::random::SplitMix64;
# use otter_psl::reasoner::{admm::ADMMReasoner, Reasoner};
# use otter_psl::reports::Report;
# use rand::SeedableRng;
// Pull atom 0 up, with weight 2, and push atom 0 down, with weight 1.
let up = Term { kind: TermKind::Hinge, weight: 2.0, coefficients: vec![-1.0], atoms: vec![0], constant: -1.0, ground_rule: GroundRuleKey::default() };
let down = Term { kind: TermKind::Linear, weight: 1.0, coefficients: vec![1.0], atoms: vec![0], constant: 0.0, ground_rule: GroundRuleKey::default() };
let terms = TermDB::new(vec![up, down]);

let mut values = vec![0.5];
let mut admm = ADMMReasoner::new(&Config::default(), SplitMix64::seed_from_u64(0));
let report = admm.optimize(&terms, &mut values).unwrap();

assert_eq!(report.report, Report::Converged);
assert!(values[0] > 0.99);
```
*/

mod minimize;

use minimize::LocalTerm;

use crate::{
    config::{
        reasoners::{ADMMConfig, StoppingConfig},
        Config, InitialValue,
    },
    db::term::TermDB,
    generic::{numeric, parallel::Parallel, random::SplitMix64},
    misc::log::targets::{self},
    reasoner::{summarise, OptimizationReport, Reasoner},
    reports::Report,
    types::err::ErrorKind,
};

/// The ADMM reasoner.
pub struct ADMMReasoner {
    config: ADMMConfig,
    stopping: StoppingConfig,
    initial_value: InitialValue,
    pool: Parallel,
    rng: SplitMix64,
}

impl ADMMReasoner {
    pub fn new(config: &Config, rng: SplitMix64) -> Self {
        ADMMReasoner {
            config: config.admm.clone(),
            stopping: config.stopping.clone(),
            initial_value: config.initial_value.value,
            pool: config.pool(),
            rng,
        }
    }
}

/// Residuals, and their tolerances.
#[derive(Clone, Copy, Debug)]
struct Residuals {
    primal: f64,
    dual: f64,
    epsilon_primal: f64,
    epsilon_dual: f64,
}

impl Residuals {
    fn unconverged() -> Self {
        Residuals {
            primal: f64::INFINITY,
            dual: f64::INFINITY,
            epsilon_primal: 0.0,
            epsilon_dual: 0.0,
        }
    }

    fn converged(&self) -> bool {
        self.primal <= self.epsilon_primal && self.dual <= self.epsilon_dual
    }
}

/// For each variable, the local copies of the variable as (term, position in term) pairs.
///
/// The copies of variable `v` are `locations[offsets[v]..offsets[v + 1]]`.
fn copies(variable_count: usize, locals: &[LocalTerm]) -> (Vec<usize>, Vec<(usize, usize)>) {
    let mut offsets = vec![0; variable_count + 1];
    for local in locals {
        for position in &local.positions {
            offsets[position + 1] += 1;
        }
    }
    for variable in 0..variable_count {
        offsets[variable + 1] += offsets[variable];
    }

    let mut next = offsets.clone();
    let mut locations = vec![(0, 0); offsets[variable_count]];
    for (term, local) in locals.iter().enumerate() {
        for (index, position) in local.positions.iter().enumerate() {
            locations[next[*position]] = (term, index);
            next[*position] += 1;
        }
    }

    (offsets, locations)
}

impl Reasoner for ADMMReasoner {
    fn optimize(&mut self, terms: &TermDB, values: &mut [f32]) -> Result<OptimizationReport, ErrorKind> {
        let step_size = self.config.step_size.value;
        let max_iterations = self.config.max_iterations.value;
        let period = self.config.compute_period.value.max(1);
        let epsilon_abs = self.config.epsilon_abs.value as f64;
        let epsilon_rel = self.config.epsilon_rel.value as f64;
        let constraint_tolerance = self.stopping.constraint_tolerance.value;

        if terms.is_empty() {
            return Ok(summarise(terms, values, 0, Report::Converged, constraint_tolerance));
        }

        let variables = terms.variables();
        let mut z = variables
            .iter()
            .map(|atom| {
                let initial = self.initial_value.value(values[*atom as usize], &mut self.rng);
                numeric::clamp_unit(initial)
            })
            .collect::<Vec<f32>>();

        let mut locals = Vec::with_capacity(terms.len());
        for term in terms.iter() {
            let positions = term
                .atoms
                .iter()
                .map(|atom| variables.binary_search(atom))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| ErrorKind::InvalidState)?;
            locals.push(LocalTerm::new(term, positions, &z));
        }

        let (offsets, locations) = copies(variables.len(), &locals);
        let copy_count = locations.len();

        let term_block = self.pool.block_size(locals.len(), 4);
        let variable_block = self.pool.block_size(z.len(), 4);

        log::info!(target: targets::ADMM, "Iterating over {} terms and {} variables, with {copy_count} local copies", locals.len(), z.len());

        let mut scratch = values.to_vec();
        let mut residuals = Residuals::unconverged();
        let mut previous_objective: Option<f64> = None;
        let mut objective_stable = false;
        let mut iteration = 0;

        while iteration < max_iterations
            && (self.stopping.run_full_iterations.value
                || !(residuals.converged() || objective_stable))
        {
            {
                let z = &z;
                self.pool.blocks_mut(&mut locals, term_block, |_, block| {
                    for local in block {
                        local.update(z, step_size);
                    }
                });
            }

            let partials = {
                let (locals, offsets, locations) = (&locals, &offsets, &locations);
                self.pool.blocks_mut(&mut z, variable_block, |offset, block| {
                    let mut dual = 0.0_f64;
                    let mut consensus_norm = 0.0_f64;

                    for (index, value) in block.iter_mut().enumerate() {
                        let variable = offset + index;
                        let held = &locations[offsets[variable]..offsets[variable + 1]];
                        let count = held.len() as f32;

                        let total = held
                            .iter()
                            .map(|(term, position)| {
                                let local = &locals[*term];
                                local.x[*position] + local.y[*position] / step_size
                            })
                            .sum::<f32>();

                        let fresh = numeric::clamp_unit(total / count);
                        dual += count as f64 * ((*value - fresh) as f64).powi(2);
                        consensus_norm += count as f64 * (fresh as f64).powi(2);
                        *value = fresh;
                    }

                    (dual, consensus_norm)
                })
            };

            if iteration % period == 0 {
                let (dual, consensus_norm) = partials
                    .iter()
                    .fold((0.0, 0.0), |(a, b), (c, d)| (a + c, b + d));

                let mut primal = 0.0_f64;
                let mut local_norm = 0.0_f64;
                let mut multiplier_norm = 0.0_f64;
                let mut lagrangian = 0.0_f64;
                for local in &locals {
                    for index in 0..local.size() {
                        let x = local.x[index] as f64;
                        let y = local.y[index] as f64;
                        let difference = x - z[local.positions[index]] as f64;

                        primal += difference * difference;
                        local_norm += x * x;
                        multiplier_norm += y * y;
                        lagrangian += y * difference;
                    }
                }
                let augmented = lagrangian + 0.5 * step_size as f64 * primal;

                let root = (copy_count as f64).sqrt() * epsilon_abs;
                residuals = Residuals {
                    primal: primal.sqrt(),
                    dual: step_size as f64 * dual.sqrt(),
                    epsilon_primal: root + epsilon_rel * local_norm.sqrt().max(consensus_norm.sqrt()),
                    epsilon_dual: root + epsilon_rel * multiplier_norm.sqrt(),
                };

                for (atom, value) in variables.iter().zip(&z) {
                    scratch[*atom as usize] = *value;
                }
                let objective = terms.objective(&scratch);

                log::debug!(target: targets::ADMM, "Iteration {iteration}: objective {objective}, {residuals:?}, lagrangian penalty {lagrangian}, augmented lagrangian penalty {augmented}");

                if self.stopping.objective_break.value {
                    if let Some(previous) = previous_objective {
                        objective_stable = numeric::equals(previous, objective, self.stopping.tolerance.value);
                    }
                    previous_objective = Some(objective);
                }
            }

            iteration += 1;
        }

        for (atom, value) in variables.iter().zip(&z) {
            values[*atom as usize] = *value;
        }

        let report = match residuals.converged() || objective_stable {
            true => Report::Converged,
            false => Report::MaxIterations,
        };

        log::info!(target: targets::ADMM, "{report} after {iteration} iterations, {residuals:?}");
        Ok(summarise(terms, values, iteration, report, constraint_tolerance))
    }
}
