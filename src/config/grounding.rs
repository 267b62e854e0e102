//! Configuration of grounding.

use crate::{context::ContextState, generic::numeric};

use super::ConfigOption;

/// Configuration of the grounding of rules.
#[derive(Clone, Debug)]
pub struct GroundingConfig {
    /// Ground rules whose worst case value is no greater than this are discarded.
    pub tautology_epsilon: ConfigOption<f64>,

    /// Run the queries of rules one at a time.
    pub serial: ConfigOption<bool>,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        GroundingConfig {
            tautology_epsilon: ConfigOption {
                name: "tautology_epsilon",
                min: 0.0,
                max: 1.0,
                max_state: ContextState::Input,
                value: numeric::STRICT_EPSILON,
            },

            serial: ConfigOption {
                name: "grounding_serial",
                min: false,
                max: true,
                max_state: ContextState::Optimized,
                value: false,
            },
        }
    }
}

/// Configuration of incremental grounding, on the activation of lazily created atoms.
#[derive(Clone, Debug)]
pub struct LazyConfig {
    /// A lazily created atom with a value at least this is activated.
    pub activation_threshold: ConfigOption<f32>,

    /// The maximum number of rounds of inference and activation.
    pub max_rounds: ConfigOption<usize>,
}

impl Default for LazyConfig {
    fn default() -> Self {
        LazyConfig {
            activation_threshold: ConfigOption {
                name: "activation_threshold",
                min: f32::MIN_POSITIVE,
                max: 1.0,
                max_state: ContextState::Optimized,
                value: 0.01,
            },

            max_rounds: ConfigOption {
                name: "lazy_max_rounds",
                min: 1,
                max: usize::MAX,
                max_state: ContextState::Optimized,
                value: 100,
            },
        }
    }
}
