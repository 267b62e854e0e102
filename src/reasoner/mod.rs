/*!
Reasoners, which assign values to random variable atoms by optimising the terms of a [term database](TermDB).

Each reasoner implements [Reasoner], and writes its values into the shared array of atom values on completion.
Only the values of atoms which appear in some term are written.

Continuous reasoners:
- [admm], consensus optimisation by the alternating direction method of multipliers.
- [dual_bcd], block coordinate descent on the dual of a regularised problem, either over connected components or over contiguous blocks of terms.

Boolean reasoners, which assign each atom zero or one (or, in the case of MC-SAT, a marginal):
- [boolean::max_walk_sat], local search.
- [boolean::mc_sat], Gibbs sampling.
*/

pub mod admm;
pub mod boolean;
pub mod dual_bcd;

use crate::{db::term::TermDB, reports::Report, types::err::ErrorKind};

/// A summary of some optimisation.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizationReport {
    /// The (unregularised) objective at the values written.
    pub objective: f64,

    /// A count of constraints violated by more than the constraint tolerance at the values written.
    pub violated_constraints: usize,

    pub iterations: usize,

    pub report: Report,
}

/// Something which optimises the terms of a term database.
pub trait Reasoner {
    /// Optimises the terms, and writes the values of each atom of some term to `values`.
    ///
    /// `values` is indexed by atom, and holds the values of observed atoms as well as the initial values of random variables.
    fn optimize(&mut self, terms: &TermDB, values: &mut [f32]) -> Result<OptimizationReport, ErrorKind>;
}

/// A report on the given values, after some number of iterations.
pub(crate) fn summarise(
    terms: &TermDB,
    values: &[f32],
    iterations: usize,
    report: Report,
    constraint_tolerance: f32,
) -> OptimizationReport {
    OptimizationReport {
        objective: terms.objective(values),
        violated_constraints: terms.violated_constraints(values, constraint_tolerance as f64),
        iterations,
        report,
    }
}
