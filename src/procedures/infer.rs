/*!
Inference over the ground rules of a context.

Inference:
1. Grounds any rule added since the last grounding, and processes any queued regrounding task.
2. [Generates terms](crate::procedures::terms) from the ground rule database.
3. Runs the [configured reasoner](crate::config::Config::reasoner) over the terms, which writes values to the random variable atoms of the atom database.

Inference may be called any number of times.
Terms are always regenerated, as values of observed atoms or the ground rule database may have changed between calls.

# Example

```rust
# use otter_psl::config::{Config, ReasonerKind};
# use otter_psl::context::{Context, ContextState};
# use otter_psl::reports::Report;
# use otter_psl::structures::constant::{Argument, Constant, ConstantType};
# use otter_psl::structures::formula::Formula;
let mut config = Config::default();
config.reasoner.value = ReasonerKind::DualBCD;
let mut ctx = Context::from_config(config);

let rain = ctx.add_predicate("Rain", &[ConstantType::Text], false).unwrap();
ctx.target(rain, vec![Constant::from("today")], 0.5).unwrap();

// A prior against rain.
let prior = !Formula::from(ctx.atom(rain, vec![Argument::var("D")]).unwrap());
ctx.add_logical_rule(prior, Some(1.0), false).unwrap();

assert!(ctx.infer().is_ok());
assert_eq!(ctx.state, ContextState::Optimized);
assert!(ctx.value_of(rain, &[Constant::from("today")]).unwrap() < 0.05);
```
*/

use rand::SeedableRng;

use crate::{
    config::ReasonerKind,
    context::{ContextState, GenericContext},
    generic::random::SplitMix64,
    reasoner::{
        admm::ADMMReasoner,
        boolean::{max_walk_sat::MaxWalkSat, mc_sat::MCSat},
        dual_bcd::{distributed::DistributedDualBCDReasoner, DualBCDReasoner},
        Reasoner,
    },
    reports::Report,
    types::err::ErrorKind,
};

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Grounds (as needed), generates terms, and optimises the values of random variable atoms with the configured reasoner.
    pub fn infer(&mut self) -> Result<Report, ErrorKind> {
        let total_time = std::time::Instant::now();
        self.config.check()?;

        if self.grounded_rules < self.rules.len() {
            self.ground()?;
        }
        if !self.work_queue.is_empty() {
            self.process_work_queue()?;
        }

        self.generate_terms();

        let rng = SplitMix64::seed_from_u64(self.rng.random());
        let kind = self.config.reasoner.value;
        log::info!("Inference with {kind} over {} terms", self.term_db.len());

        let terms = &self.term_db;
        let values = self.atom_db.values_mut();

        let optimization = match kind {
            ReasonerKind::ADMM => ADMMReasoner::new(&self.config, rng).optimize(terms, values)?,
            ReasonerKind::DualBCD => DualBCDReasoner::new(&self.config).optimize(terms, values)?,
            ReasonerKind::DistributedDualBCD => {
                DistributedDualBCDReasoner::new(&self.config).optimize(terms, values)?
            }
            ReasonerKind::MaxWalkSat => MaxWalkSat::new(&self.config, rng).optimize(terms, values)?,
            ReasonerKind::MCSat => MCSat::new(&self.config, rng).optimize(terms, values)?,
        };

        self.counters.iterations += optimization.iterations;
        self.counters.time += total_time.elapsed();
        self.state = ContextState::Optimized;

        log::info!(
            "{kind}: {} after {} iterations, objective {}, violated constraints {}",
            optimization.report,
            optimization.iterations,
            optimization.objective,
            optimization.violated_constraints
        );

        let report = optimization.report;
        self.last_optimization = Some(optimization);
        Ok(report)
    }
}
