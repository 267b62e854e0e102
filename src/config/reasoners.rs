//! Configuration of reasoners.
//!
//! Stopping criteria shared by the continuous reasoners are in [StoppingConfig], while options particular to some reasoner are in a dedicated structure.

use crate::{context::ContextState, generic::numeric};

use super::ConfigOption;

/// Stopping criteria, and tolerances, shared by reasoners.
#[derive(Clone, Debug)]
pub struct StoppingConfig {
    /// Stop if the objective is unchanged (to within [tolerance](StoppingConfig::tolerance)) between checks.
    pub objective_break: ConfigOption<bool>,

    /// How close two objective values need to be to be considered the same.
    pub tolerance: ConfigOption<f64>,

    /// Ignore all other stopping criteria and run to the maximum number of iterations.
    pub run_full_iterations: ConfigOption<bool>,

    /// Stop if no variable moves by more than this between checks.
    pub variable_movement_tolerance: ConfigOption<f32>,

    /// A constraint is violated if violated by more than this.
    pub constraint_tolerance: ConfigOption<f32>,
}

impl Default for StoppingConfig {
    fn default() -> Self {
        StoppingConfig {
            objective_break: ConfigOption {
                name: "objective_break",
                min: false,
                max: true,
                max_state: ContextState::Optimized,
                value: false,
            },

            tolerance: ConfigOption {
                name: "objective_tolerance",
                min: 0.0,
                max: f64::MAX,
                max_state: ContextState::Optimized,
                value: 1e-5,
            },

            run_full_iterations: ConfigOption {
                name: "run_full_iterations",
                min: false,
                max: true,
                max_state: ContextState::Optimized,
                value: false,
            },

            variable_movement_tolerance: ConfigOption {
                name: "variable_movement_tolerance",
                min: 0.0,
                max: 1.0,
                max_state: ContextState::Optimized,
                value: 0.0,
            },

            constraint_tolerance: ConfigOption {
                name: "constraint_tolerance",
                min: 0.0,
                max: 1.0,
                max_state: ContextState::Optimized,
                value: numeric::RELAXED_EPSILON as f32,
            },
        }
    }
}

/// Configuration of [ADMM](crate::reasoner::admm).
#[derive(Clone, Debug)]
pub struct ADMMConfig {
    pub max_iterations: ConfigOption<usize>,

    /// The step size, ρ.
    pub step_size: ConfigOption<f32>,

    /// Absolute component of the residual stopping criteria.
    pub epsilon_abs: ConfigOption<f32>,

    /// Relative component of the residual stopping criteria.
    pub epsilon_rel: ConfigOption<f32>,

    /// Residuals are computed, and convergence checked, once every period of this many iterations.
    pub compute_period: ConfigOption<usize>,
}

impl Default for ADMMConfig {
    fn default() -> Self {
        ADMMConfig {
            max_iterations: ConfigOption {
                name: "admm_max_iterations",
                min: 1,
                max: usize::MAX,
                max_state: ContextState::Optimized,
                value: 25_000,
            },

            step_size: ConfigOption {
                name: "admm_step_size",
                min: f32::MIN_POSITIVE,
                max: f32::MAX,
                max_state: ContextState::Optimized,
                value: 1.0,
            },

            epsilon_abs: ConfigOption {
                name: "admm_epsilon_abs",
                min: f32::MIN_POSITIVE,
                max: f32::MAX,
                max_state: ContextState::Optimized,
                value: 1e-5,
            },

            epsilon_rel: ConfigOption {
                name: "admm_epsilon_rel",
                min: f32::MIN_POSITIVE,
                max: f32::MAX,
                max_state: ContextState::Optimized,
                value: 1e-3,
            },

            compute_period: ConfigOption {
                name: "admm_compute_period",
                min: 1,
                max: usize::MAX,
                max_state: ContextState::Optimized,
                value: 50,
            },
        }
    }
}

/// Configuration of [dual block coordinate descent](crate::reasoner::dual_bcd).
#[derive(Clone, Debug)]
pub struct DualBCDConfig {
    pub max_iterations: ConfigOption<usize>,

    /// The weight of the quadratic regularisation of the primal, λ.
    pub regularization: ConfigOption<f64>,

    /// Primal values are recovered, and stopping criteria checked, once every period of this many iterations.
    pub compute_period: ConfigOption<usize>,

    /// Stop when the gap between the primal and dual objectives is within [primal_dual_tolerance](DualBCDConfig::primal_dual_tolerance).
    pub primal_dual_break: ConfigOption<bool>,

    pub primal_dual_tolerance: ConfigOption<f64>,
}

impl Default for DualBCDConfig {
    fn default() -> Self {
        DualBCDConfig {
            max_iterations: ConfigOption {
                name: "dual_bcd_max_iterations",
                min: 1,
                max: usize::MAX,
                max_state: ContextState::Optimized,
                value: 10_000,
            },

            regularization: ConfigOption {
                name: "dual_bcd_regularization",
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
                max_state: ContextState::Optimized,
                value: 1e-2,
            },

            compute_period: ConfigOption {
                name: "dual_bcd_compute_period",
                min: 1,
                max: usize::MAX,
                max_state: ContextState::Optimized,
                value: 10,
            },

            primal_dual_break: ConfigOption {
                name: "dual_bcd_primal_dual_break",
                min: false,
                max: true,
                max_state: ContextState::Optimized,
                value: true,
            },

            primal_dual_tolerance: ConfigOption {
                name: "dual_bcd_primal_dual_tolerance",
                min: 0.0,
                max: f64::MAX,
                max_state: ContextState::Optimized,
                value: 1e-2,
            },
        }
    }
}

/// Configuration of [MaxWalkSat](crate::reasoner::boolean::max_walk_sat).
#[derive(Clone, Debug)]
pub struct MaxWalkSatConfig {
    pub max_flips: ConfigOption<usize>,

    /// The probability of a random, rather than greedy, flip.
    pub noise: ConfigOption<f64>,
}

impl Default for MaxWalkSatConfig {
    fn default() -> Self {
        MaxWalkSatConfig {
            max_flips: ConfigOption {
                name: "walksat_max_flips",
                min: 1,
                max: usize::MAX,
                max_state: ContextState::Optimized,
                value: 50_000,
            },

            noise: ConfigOption {
                name: "walksat_noise",
                min: 0.0,
                max: 1.0,
                max_state: ContextState::Optimized,
                value: 0.01,
            },
        }
    }
}

/// Configuration of [MC-SAT](crate::reasoner::boolean::mc_sat).
#[derive(Clone, Debug)]
pub struct MCSatConfig {
    /// The length of the Markov chain.
    pub samples: ConfigOption<usize>,

    /// The number of samples discarded before marginals are accumulated.
    pub burn_in: ConfigOption<usize>,
}

impl Default for MCSatConfig {
    fn default() -> Self {
        MCSatConfig {
            samples: ConfigOption {
                name: "mcsat_samples",
                min: 1,
                max: usize::MAX,
                max_state: ContextState::Optimized,
                value: 2500,
            },

            burn_in: ConfigOption {
                name: "mcsat_burn_in",
                min: 0,
                max: usize::MAX,
                max_state: ContextState::Optimized,
                value: 500,
            },
        }
    }
}
