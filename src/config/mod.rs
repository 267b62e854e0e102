/*!
Configuration of a context.

All configuration for a context is contained within the [Config] of the context.
Reasoners and grounding procedures read (or clone) the parts of the configuration relevant to them when called.

Each option is a [ConfigOption], with bounds and the latest [state](ContextState) of a context in which the option may be changed.
In particular, options which influence grounding may only be changed before grounding, while options of reasoners may be changed at any time.

```rust
# use otter_psl::config::{Config, ReasonerKind};
# use otter_psl::context::ContextState;
let mut config = Config::default();
assert!(config.reasoner.set(ReasonerKind::DualBCD, &ContextState::Optimized).is_ok());
assert!(config.grounding.tautology_epsilon.set(0.1, &ContextState::Optimized).is_err());
assert!(config.admm.step_size.set(-1.0, &ContextState::Configuration).is_err());
```
*/

mod config_option;
pub use config_option::ConfigOption;

pub mod grounding;
pub mod reasoners;

mod kinds;
pub use kinds::{InitialValue, ReasonerKind};

use grounding::{GroundingConfig, LazyConfig};
use reasoners::{ADMMConfig, DualBCDConfig, MCSatConfig, MaxWalkSatConfig, StoppingConfig};

use crate::{context::ContextState, generic::parallel::Parallel, types::err::ConfigError};

/// The primary configuration structure.
#[derive(Clone, Debug)]
pub struct Config {
    /// Configuration of grounding.
    pub grounding: GroundingConfig,

    /// Configuration of incremental grounding.
    pub lazy: LazyConfig,

    /// Which reasoner to use during inference.
    pub reasoner: ConfigOption<ReasonerKind>,

    /// Stopping criteria shared by reasoners.
    pub stopping: StoppingConfig,

    pub admm: ADMMConfig,

    pub dual_bcd: DualBCDConfig,

    pub walksat: MaxWalkSatConfig,

    pub mcsat: MCSatConfig,

    /// The values a reasoner begins with.
    pub initial_value: ConfigOption<InitialValue>,

    /// The seed of the source of rng.
    pub seed: ConfigOption<u64>,

    /// The number of threads in the worker pool.
    pub threads: ConfigOption<usize>,
}

impl Default for Config {
    /// The default context is (roughly) configured to provide quick, deterministic, results on small models.
    fn default() -> Self {
        Config {
            grounding: GroundingConfig::default(),
            lazy: LazyConfig::default(),

            reasoner: ConfigOption {
                name: "reasoner",
                min: ReasonerKind::MIN,
                max: ReasonerKind::MAX,
                max_state: ContextState::Optimized,
                value: ReasonerKind::ADMM,
            },

            stopping: StoppingConfig::default(),

            admm: ADMMConfig::default(),
            dual_bcd: DualBCDConfig::default(),
            walksat: MaxWalkSatConfig::default(),
            mcsat: MCSatConfig::default(),

            initial_value: ConfigOption {
                name: "initial_value",
                min: InitialValue::MIN,
                max: InitialValue::MAX,
                max_state: ContextState::Optimized,
                value: InitialValue::Atom,
            },

            seed: ConfigOption {
                name: "seed",
                min: 0,
                max: u64::MAX,
                max_state: ContextState::Configuration,
                value: 0,
            },

            threads: ConfigOption {
                name: "threads",
                min: 1,
                max: usize::MAX,
                max_state: ContextState::Optimized,
                value: Parallel::available_threads(),
            },
        }
    }
}

impl Config {
    /// Ok if every option is within its bounds.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.grounding.tautology_epsilon.check()?;
        self.lazy.activation_threshold.check()?;
        self.lazy.max_rounds.check()?;

        self.stopping.tolerance.check()?;
        self.stopping.variable_movement_tolerance.check()?;
        self.stopping.constraint_tolerance.check()?;

        self.admm.max_iterations.check()?;
        self.admm.step_size.check()?;
        self.admm.epsilon_abs.check()?;
        self.admm.epsilon_rel.check()?;
        self.admm.compute_period.check()?;

        self.dual_bcd.max_iterations.check()?;
        self.dual_bcd.regularization.check()?;
        self.dual_bcd.compute_period.check()?;
        self.dual_bcd.primal_dual_tolerance.check()?;

        self.walksat.max_flips.check()?;
        self.walksat.noise.check()?;

        self.mcsat.samples.check()?;
        self.mcsat.burn_in.check()?;
        if self.mcsat.samples.value <= self.mcsat.burn_in.value {
            return Err(ConfigError::OutOfRange(self.mcsat.burn_in.name));
        }

        self.threads.check()?;
        Ok(())
    }

    /// A worker pool of the configured size.
    pub fn pool(&self) -> Parallel {
        Parallel::new(self.threads.value)
    }
}
