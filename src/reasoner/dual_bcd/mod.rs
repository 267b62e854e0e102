/*!
Block coordinate descent on the dual of a regularised problem.

The primal problem is regularised to `Σ w·h(x) + λ(h(x)² + ‖x‖²)`, with `h` the hinge of each term, subject to the constraints and to `0 ≤ x ≤ 1`.
As the regularised problem is strongly convex, the dual is smooth, and the primal is recovered from the dual by `x = −message/(2λ)` (see [atom]).

Each term is a block of the dual, with a dual variable and, for a hinge, a dual variable for the lower bound of its slack.
A block update computes the partials of the block, takes the largest step along them which keeps every dual variable feasible (or the exact minimiser along the step, if smaller), and passes the change on to the variables of the term.

Terms are normalised before optimisation:
- `≥` constraints are negated into `≤` constraints.
- Linear terms are treated as hinges.

Two variants are provided:
- [DualBCDReasoner], which optimises each connected component of the terms independently, in parallel.
- [DistributedDualBCDReasoner](distributed::DistributedDualBCDReasoner), which sweeps contiguous blocks of terms in parallel without synchronisation between blocks.

The stopping criteria, checked every [compute period](crate::config::reasoners::DualBCDConfig::compute_period), are in order:
1. Stop once the iteration count exceeds the maximum.
2. Continue, if configured to run full iterations.
3. Continue, while some constraint is violated.
4. Stop, if configured to break on a stable objective and the objective is stable.
5. Stop, if no variable moved by more than the variable movement tolerance.
6. Stop, if configured to break on the primal dual gap and the gap is within tolerance.
*/

pub mod atom;
pub mod distributed;

use atom::{DualAtom, DualAtomStore};
use petgraph::unionfind::UnionFind;

use crate::{
    config::{
        reasoners::{DualBCDConfig, StoppingConfig},
        Config,
    },
    db::term::{Term, TermDB, TermKind},
    generic::{numeric, parallel::Parallel},
    misc::log::targets::{self},
    reasoner::{summarise, OptimizationReport, Reasoner},
    reports::Report,
    structures::comparator::Comparator,
    types::err::ErrorKind,
};

/// The form of a term, in the dual.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DualKind {
    Hinge,
    SquaredHinge,
    Constraint { equality: bool },
}

/// A term, with its dual variables.
#[derive(Clone, Debug)]
pub struct DualTerm {
    pub kind: DualKind,
    pub weight: f64,
    pub coefficients: Vec<f64>,

    /// Positions of the variables of the term in some store of [DualAtom]s.
    pub positions: Vec<usize>,

    pub constant: f64,

    pub dual: f64,
    pub slack: f64,

    /// ‖c‖²
    norm: f64,
}

impl DualTerm {
    pub fn new(term: &Term, positions: Vec<usize>) -> Self {
        let (kind, sign) = match term.kind {
            TermKind::Linear | TermKind::Hinge => (DualKind::Hinge, 1.0),
            TermKind::SquaredHinge => (DualKind::SquaredHinge, 1.0),
            TermKind::Constraint(Comparator::LessThanEqual) => (DualKind::Constraint { equality: false }, 1.0),
            TermKind::Constraint(Comparator::GreaterThanEqual) => (DualKind::Constraint { equality: false }, -1.0),
            TermKind::Constraint(Comparator::Equal) => (DualKind::Constraint { equality: true }, 1.0),
        };

        let coefficients = term
            .coefficients
            .iter()
            .map(|c| sign * *c as f64)
            .collect::<Vec<_>>();

        DualTerm {
            kind,
            weight: term.weight as f64,
            norm: coefficients.iter().map(|c| c * c).sum(),
            coefficients,
            positions,
            constant: sign * term.constant as f64,
            dual: 0.0,
            slack: 0.0,
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self.kind, DualKind::Constraint { equality: true })
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self.kind, DualKind::Constraint { .. })
    }

    fn linear_value(&self, values: &[f32]) -> f64 {
        self.coefficients
            .iter()
            .zip(&self.positions)
            .map(|(c, position)| c * values[*position] as f64)
            .sum::<f64>()
            - self.constant
    }

    /// The regularised loss of the term, and whether the term is a violated constraint.
    fn primal(&self, values: &[f32], regularization: f64, tolerance: f64) -> (f64, bool) {
        let value = self.linear_value(values);
        match self.kind {
            DualKind::Constraint { equality } => {
                let violation = match equality {
                    true => value.abs(),
                    false => value.max(0.0),
                };
                (0.0, violation > tolerance)
            }

            DualKind::Hinge | DualKind::SquaredHinge => {
                let hinge = value.max(0.0);
                let loss = match self.kind {
                    DualKind::SquaredHinge => hinge * hinge,
                    _ => hinge,
                };
                (self.weight * loss + regularization * hinge * hinge, false)
            }
        }
    }

    fn dual_partial(&self, atoms: &(impl DualAtomStore + ?Sized), regularization: f64) -> f64 {
        let messages = self
            .coefficients
            .iter()
            .zip(&self.positions)
            .map(|(c, position)| c * atoms.state(*position).message)
            .sum::<f64>();

        let mut partial = messages / regularization;
        match self.kind {
            DualKind::SquaredHinge => partial += self.dual / (regularization + self.weight),
            DualKind::Hinge => partial += (self.dual + self.slack - self.weight) / regularization,
            DualKind::Constraint { .. } => {}
        }
        partial += 2.0 * self.constant;

        match !self.is_equality()
            && partial > 0.0
            && numeric::is_zero(self.dual, numeric::STRICT_EPSILON)
        {
            true => 0.0,
            false => partial,
        }
    }

    fn slack_partial(&self, regularization: f64) -> f64 {
        match self.kind {
            DualKind::Hinge => {
                let partial = (self.slack + self.dual - self.weight) / regularization;
                match partial > 0.0 && numeric::is_zero(self.slack, numeric::STRICT_EPSILON) {
                    true => 0.0,
                    false => partial,
                }
            }
            _ => 0.0,
        }
    }

    /// The minimiser of the dual along the partials, ignoring the bounds of dual variables.
    fn subproblem_minimizer(
        &self,
        atoms: &(impl DualAtomStore + ?Sized),
        regularization: f64,
        dual_partial: f64,
        slack_partial: f64,
    ) -> f64 {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        let mut lower_sum = 0.0;
        let mut upper_sum = 0.0;

        for (c, position) in self.coefficients.iter().zip(&self.positions) {
            let atom = atoms.state(*position);
            let lower = atom.lower_partial(regularization);
            let upper = atom.upper_partial(regularization);

            lower_sum += c * lower;
            upper_sum += c * upper;

            numerator += lower * lower + upper * upper;
            denominator += (lower - upper - c * dual_partial) * lower;
            denominator += (upper - lower + c * dual_partial) * upper;
        }
        denominator /= regularization;

        let mut statistic = (dual_partial * self.norm - lower_sum + upper_sum) / regularization;
        match self.kind {
            DualKind::SquaredHinge => statistic += dual_partial / (regularization + self.weight),
            DualKind::Hinge => {
                statistic += dual_partial / regularization;
                statistic += slack_partial / regularization;

                numerator += slack_partial * slack_partial;
                denominator += ((slack_partial + dual_partial) / regularization) * slack_partial;
            }
            DualKind::Constraint { .. } => {}
        }

        numerator += dual_partial * dual_partial;
        denominator += statistic * dual_partial;

        match numerator == 0.0 || denominator == 0.0 {
            true => 0.0,
            false => numerator / denominator,
        }
    }

    /// The largest step which keeps every dual variable feasible, or the subproblem minimiser if smaller.
    fn step_size(
        &self,
        atoms: &(impl DualAtomStore + ?Sized),
        regularization: f64,
        dual_partial: f64,
        slack_partial: f64,
    ) -> f64 {
        let minimizer = self.subproblem_minimizer(atoms, regularization, dual_partial, slack_partial);

        let mut ratio = f64::INFINITY;
        if dual_partial > 0.0 && !self.is_equality() {
            ratio = self.dual / dual_partial;
        }
        if slack_partial > 0.0 {
            ratio = ratio.min(self.slack / slack_partial);
        }

        for position in &self.positions {
            let atom = atoms.state(*position);

            let lower = atom.lower_partial(regularization);
            if lower > 0.0 {
                ratio = ratio.min(atom.lower / lower);
            }

            let upper = atom.upper_partial(regularization);
            if upper > 0.0 {
                ratio = ratio.min(atom.upper / upper);
            }
        }

        ratio.min(minimizer)
    }

    /// Minimises the dual over the dual variables of the term.
    pub fn block_update(&mut self, atoms: &mut (impl DualAtomStore + ?Sized), regularization: f64) {
        let dual_partial = self.dual_partial(atoms, regularization);
        let slack_partial = self.slack_partial(regularization);
        let step = self.step_size(atoms, regularization, dual_partial, slack_partial);

        let mut updated = self.dual - step * dual_partial;
        if !self.is_equality() {
            updated = updated.max(0.0);
        }
        let delta = updated - self.dual;
        self.dual = updated;

        for (c, position) in self.coefficients.iter().zip(&self.positions) {
            atoms.update(*position, delta, *c, regularization, step);
        }

        if self.kind == DualKind::Hinge {
            self.slack = (self.slack - step * slack_partial).max(0.0);
        }
    }

    /// The contribution of the term, and its slack bound, to the dual objective (before scaling by −½).
    fn dual_objective(&self, atoms: &(impl DualAtomStore + ?Sized), regularization: f64) -> f64 {
        let messages = self
            .coefficients
            .iter()
            .zip(&self.positions)
            .map(|(c, position)| c * atoms.state(*position).message)
            .sum::<f64>();

        let mut objective = self.dual * messages / (2.0 * regularization);
        match self.kind {
            DualKind::SquaredHinge => {
                objective += self.dual * self.dual / (2.0 * (regularization + self.weight));
            }
            DualKind::Hinge => {
                objective += self.dual * self.dual / (2.0 * regularization);
                objective += self.dual * self.slack / (2.0 * regularization);
                objective -= self.weight * self.dual / regularization;
                objective += self.weight * self.weight / (2.0 * regularization);

                objective += self.slack * self.dual / (2.0 * regularization);
                objective += self.slack * self.slack / (2.0 * regularization);
                objective -= self.slack * self.weight / regularization;
            }
            DualKind::Constraint { .. } => {}
        }
        objective + 2.0 * self.constant * self.dual
    }
}

/// Objectives at some check.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Check {
    pub primal: f64,
    pub dual: f64,
    pub violated_constraints: usize,
    pub movement: f32,
}

/// The primal (regularised) and dual objectives of some terms and atoms, with `values` the primal values indexed by position.
pub(crate) fn check(
    terms: &[DualTerm],
    atoms: &(impl DualAtomStore + ?Sized),
    values: &[f32],
    regularization: f64,
    tolerance: f64,
    movement: f32,
) -> Check {
    let mut primal = 0.0;
    let mut dual = 0.0;
    let mut violated_constraints = 0;

    for term in terms {
        let (loss, violated) = term.primal(values, regularization, tolerance);
        primal += loss;
        violated_constraints += violated as usize;
        dual += term.dual_objective(atoms, regularization);
    }

    for (position, value) in values.iter().enumerate() {
        primal += regularization * (*value as f64).powi(2);
        let atom = atoms.state(position);
        dual += atom.lower_objective(regularization) + atom.upper_objective(regularization);
    }

    Check {
        primal,
        dual: -0.5 * dual,
        violated_constraints,
        movement,
    }
}

/// Stopping criteria, shared by the variants.
#[derive(Clone, Debug)]
pub(crate) struct Stopping {
    pub config: DualBCDConfig,
    pub stopping: StoppingConfig,
}

impl Stopping {
    /// Some report if optimisation should stop at the given (one-indexed) iteration.
    pub fn stop(&self, iteration: usize, check: &Check, previous: Option<&Check>) -> Option<Report> {
        if iteration > self.config.max_iterations.value {
            return Some(Report::MaxIterations);
        }

        if self.stopping.run_full_iterations.value {
            return None;
        }

        if check.violated_constraints > 0 {
            return None;
        }

        if self.stopping.objective_break.value {
            if let Some(previous) = previous {
                if numeric::equals(check.primal, previous.primal, self.stopping.tolerance.value) {
                    return Some(Report::Converged);
                }
            }
        }

        if check.movement < self.stopping.variable_movement_tolerance.value {
            return Some(Report::Converged);
        }

        if self.config.primal_dual_break.value
            && check.primal - check.dual <= self.config.primal_dual_tolerance.value
        {
            return Some(Report::Converged);
        }

        None
    }
}

/// Recovers primal values from the atoms, and returns the greatest change in any value.
pub(crate) fn recover_primal(
    atoms: &(impl DualAtomStore + ?Sized),
    values: &mut [f32],
    regularization: f64,
) -> f32 {
    let mut movement = 0.0_f32;
    for (position, value) in values.iter_mut().enumerate() {
        let fresh = atoms.state(position).primal(regularization);
        movement = movement.max((fresh - *value).abs());
        *value = fresh;
    }
    movement
}

/// The terms and variables of a connected component.
#[derive(Clone, Debug, Default)]
struct Component {
    terms: Vec<DualTerm>,
    atoms: Vec<DualAtom>,

    /// Positions of the variables of the component in the variables of the term database.
    variables: Vec<usize>,

    /// Primal values, by position in the component.
    values: Vec<f32>,
}

impl Component {
    /// Optimises the component, and returns the count of iterations and a report.
    fn optimize(&mut self, stopping: &Stopping, regularization: f64, tolerance: f64) -> (usize, Report) {
        let period = stopping.config.compute_period.value.max(1);
        let mut previous: Option<Check> = None;
        let mut iteration = 1;

        loop {
            for term in self.terms.iter_mut() {
                term.block_update(self.atoms.as_mut_slice(), regularization);
            }

            if (iteration - 1) % period == 0 {
                let movement = recover_primal(self.atoms.as_slice(), &mut self.values, regularization);
                let check = check(&self.terms, self.atoms.as_slice(), &self.values, regularization, tolerance, movement);

                log::trace!(target: targets::DUAL_BCD, "Component iteration {iteration}: {check:?}");

                if let Some(report) = stopping.stop(iteration, &check, previous.as_ref()) {
                    return (iteration, report);
                }
                previous = Some(check);
            }

            iteration += 1;
        }
    }
}

/// Splits the terms into connected components, with terms connected when they share some variable.
///
/// Components are ordered by their least variable.
fn components(terms: &TermDB) -> Result<Vec<Component>, ErrorKind> {
    let variables = terms.variables();

    let mut positions = Vec::with_capacity(terms.len());
    let mut union_find = UnionFind::<usize>::new(variables.len());
    for term in terms.iter() {
        let term_positions = term
            .atoms
            .iter()
            .map(|atom| variables.binary_search(atom))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ErrorKind::InvalidState)?;

        for pair in term_positions.windows(2) {
            union_find.union(pair[0], pair[1]);
        }
        positions.push(term_positions);
    }

    let labels = union_find.into_labeling();

    let mut component_of_label = vec![usize::MAX; variables.len()];
    let mut local_position = vec![0; variables.len()];
    let mut components: Vec<Component> = Vec::default();

    for (variable, label) in labels.iter().enumerate() {
        if component_of_label[*label] == usize::MAX {
            component_of_label[*label] = components.len();
            components.push(Component::default());
        }
        let component = &mut components[component_of_label[*label]];
        local_position[variable] = component.variables.len();
        component.variables.push(variable);
        component.atoms.push(DualAtom::default());
        component.values.push(0.0);
    }

    for (term, term_positions) in terms.iter().zip(positions) {
        let Some(first) = term_positions.first() else {
            continue;
        };
        let component = component_of_label[labels[*first]];
        let local = term_positions.iter().map(|p| local_position[*p]).collect();
        components[component].terms.push(DualTerm::new(term, local));
    }

    Ok(components)
}

/// The dual BCD reasoner, over connected components.
pub struct DualBCDReasoner {
    stopping: Stopping,
    pool: Parallel,
}

impl DualBCDReasoner {
    pub fn new(config: &Config) -> Self {
        DualBCDReasoner {
            stopping: Stopping {
                config: config.dual_bcd.clone(),
                stopping: config.stopping.clone(),
            },
            pool: config.pool(),
        }
    }
}

impl Reasoner for DualBCDReasoner {
    fn optimize(&mut self, terms: &TermDB, values: &mut [f32]) -> Result<OptimizationReport, ErrorKind> {
        let regularization = self.stopping.config.regularization.value;
        let constraint_tolerance = self.stopping.stopping.constraint_tolerance.value;

        let mut components = components(terms)?;
        let block_size = self.pool.block_size(components.len(), 4);

        log::info!(target: targets::DUAL_BCD, "Optimising {} components in blocks of {block_size}", components.len());

        let stopping = &self.stopping;
        let results = self.pool.blocks_mut(&mut components, block_size, |_, block| {
            block
                .iter_mut()
                .map(|component| component.optimize(stopping, regularization, constraint_tolerance as f64))
                .collect::<Vec<_>>()
        });

        let mut iterations = 0;
        let mut report = Report::Converged;
        for (component_iterations, component_report) in results.into_iter().flatten() {
            iterations = iterations.max(component_iterations);
            if component_report == Report::MaxIterations {
                report = Report::MaxIterations;
            }
        }

        let variables = terms.variables();
        for component in &components {
            for (position, value) in component.variables.iter().zip(&component.values) {
                values[variables[*position] as usize] = numeric::clamp_unit(*value);
            }
        }

        log::info!(target: targets::DUAL_BCD, "{report} with at most {iterations} iterations in any component");
        Ok(summarise(terms, values, iterations, report, constraint_tolerance))
    }
}

#[cfg(test)]
mod dual_bcd_tests {
    use super::*;
    use crate::db::GroundRuleKey;

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
    fn greater_than_constraints_are_negated() {
        let t = term(TermKind::Constraint(Comparator::GreaterThanEqual), 0.0, vec![1.0, -2.0], vec![0, 1], 0.5);
        let dual = DualTerm::new(&t, vec![0, 1]);
        assert_eq!(dual.coefficients, vec![-1.0, 2.0]);
        assert_eq!(dual.constant, -0.5);
        assert_eq!(dual.kind, DualKind::Constraint { equality: false });

        let linear = DualTerm::new(&term(TermKind::Linear, 1.0, vec![1.0], vec![0], 0.0), vec![0]);
        assert_eq!(linear.kind, DualKind::Hinge);
    }

    #[test]
    fn components_split_on_shared_variables() {
        let terms = TermDB::new(vec![
            term(TermKind::Hinge, 1.0, vec![1.0, 1.0], vec![0, 3], 0.0),
            term(TermKind::Hinge, 1.0, vec![1.0], vec![5], 0.0),
            term(TermKind::Hinge, 1.0, vec![1.0, -1.0], vec![3, 7], 0.0),
        ]);

        let components = components(&terms).unwrap();
        assert_eq!(components.len(), 2);

        assert_eq!(components[0].variables, vec![0, 1, 3]);
        assert_eq!(components[0].terms.len(), 2);
        assert_eq!(components[0].terms[1].positions, vec![1, 2]);

        assert_eq!(components[1].variables, vec![2]);
        assert_eq!(components[1].terms[0].positions, vec![0]);
    }

    #[test]
    fn single_prior() {
        // A prior pulling atom 0 towards one.
        let terms = TermDB::new(vec![term(TermKind::Hinge, 1.0, vec![-1.0], vec![0], -1.0)]);
        let mut values = vec![0.0];

        let mut reasoner = DualBCDReasoner::new(&Config::default());
        let report = reasoner.optimize(&terms, &mut values).unwrap();

        assert_eq!(report.report, Report::Converged);
        assert!(values[0] > 0.95);
    }
}
