//! Local copies of the variables of a term, and the closed form minimisation of each term kind.

use crate::{
    db::term::{Term, TermKind},
    structures::comparator::Comparator,
};

/// A term, with a local copy `x` of its variables and multipliers `y`.
#[derive(Clone, Debug)]
pub(super) struct LocalTerm {
    kind: TermKind,
    weight: f32,
    coefficients: Vec<f32>,
    constant: f32,

    /// ‖c‖²
    norm: f32,

    /// Positions of the variables of the term in the consensus vector.
    pub positions: Vec<usize>,

    pub x: Vec<f32>,
    pub y: Vec<f32>,
}

impl LocalTerm {
    pub fn new(term: &Term, positions: Vec<usize>, z: &[f32]) -> Self {
        let x = positions.iter().map(|position| z[*position]).collect();
        LocalTerm {
            kind: term.kind,
            weight: term.weight,
            coefficients: term.coefficients.clone(),
            constant: term.constant,
            norm: term.coefficients.iter().map(|c| c * c).sum(),
            y: vec![0.0; positions.len()],
            positions,
            x,
        }
    }

    pub fn size(&self) -> usize {
        self.positions.len()
    }

    fn dot(&self) -> f32 {
        self.coefficients.iter().zip(&self.x).map(|(c, x)| c * x).sum()
    }

    /// x += scale·c
    fn shift(&mut self, scale: f32) {
        for (x, c) in self.x.iter_mut().zip(&self.coefficients) {
            *x += scale * c;
        }
    }

    /// Projects x onto the hyperplane c·x = b, given c·x.
    fn project(&mut self, dot: f32) {
        if self.norm > 0.0 {
            self.shift((self.constant - dot) / self.norm);
        }
    }

    /// Updates the multipliers against the consensus `z`, and then minimises the term from `z − y/ρ`.
    pub fn update(&mut self, z: &[f32], step_size: f32) {
        for index in 0..self.size() {
            let consensus = z[self.positions[index]];
            self.y[index] += step_size * (self.x[index] - consensus);
            self.x[index] = consensus - self.y[index] / step_size;
        }
        self.minimize(step_size);
    }

    /// Minimises `loss(x) + ρ/2‖x − x₀‖²`, with x₀ the current value of x.
    fn minimize(&mut self, step_size: f32) {
        let b = self.constant;
        let w = self.weight;

        match self.kind {
            TermKind::Linear => self.shift(-w / step_size),

            TermKind::Hinge => {
                let dot = self.dot();
                if dot <= b {
                    return;
                }

                let shift = w / step_size;
                match dot - shift * self.norm >= b {
                    true => self.shift(-shift),
                    false => self.project(dot),
                }
            }

            TermKind::SquaredHinge => {
                let dot = self.dot();
                if dot <= b {
                    return;
                }

                // (ρI + 2w·ccᵀ)⁻¹ by Sherman–Morrison, applied to ρx₀ + 2wb·c.
                let v_dot = step_size * dot + 2.0 * w * b * self.norm;
                let k = (2.0 * w / (step_size * step_size)) * v_dot
                    / (1.0 + 2.0 * w * self.norm / step_size);
                self.shift(2.0 * w * b / step_size - k);
            }

            TermKind::Constraint(comparator) => {
                let dot = self.dot();
                let violated = match comparator {
                    Comparator::LessThanEqual => dot > b,
                    Comparator::GreaterThanEqual => dot < b,
                    Comparator::Equal => true,
                };
                if violated {
                    self.project(dot);
                }
            }
        }
    }
}

#[cfg(test)]
mod minimize_tests {
    use super::*;
    use crate::{db::GroundRuleKey, generic::numeric};

    fn local(kind: TermKind, coefficients: Vec<f32>, constant: f32, z: &[f32]) -> LocalTerm {
        let term = Term {
            kind,
            weight: 1.0,
            atoms: (0..coefficients.len() as u32).collect(),
            coefficients,
            constant,
            ground_rule: GroundRuleKey::default(),
        };
        LocalTerm::new(&term, (0..z.len()).collect(), z)
    }

    fn close(a: f32, b: f32) -> bool {
        numeric::equals(a as f64, b as f64, 1e-5)
    }

    #[test]
    fn hinge_inactive_is_unchanged() {
        let mut term = local(TermKind::Hinge, vec![1.0, -1.0], 0.0, &[0.25, 0.75]);
        term.update(&[0.25, 0.75], 1.0);
        assert_eq!(term.x, vec![0.25, 0.75]);
    }

    #[test]
    fn hinge_steps_or_projects() {
        // A large violation, so a full step remains active.
        let mut term = local(TermKind::Hinge, vec![1.0], 0.0, &[2.0]);
        term.update(&[2.0], 1.0);
        assert!(close(term.x[0], 1.0));

        // A small violation, so the minimiser is on the hyperplane.
        let mut term = local(TermKind::Hinge, vec![1.0], 0.0, &[0.5]);
        term.update(&[0.5], 1.0);
        assert!(close(term.x[0], 0.0));
    }

    #[test]
    fn squared_hinge_closed_form() {
        // w(x − b)² + ρ/2(x − x₀)², minimised at (ρx₀ + 2wb)/(ρ + 2w).
        let mut term = local(TermKind::SquaredHinge, vec![1.0], 0.25, &[1.0]);
        term.update(&[1.0], 1.0);
        assert!(close(term.x[0], (1.0 + 0.5) / 3.0));

        // Two variables, by the same form along c.
        let mut term = local(TermKind::SquaredHinge, vec![1.0, 1.0], 0.0, &[0.5, 0.5]);
        term.update(&[0.5, 0.5], 2.0);
        // c·x₀ = 1, and c·x = ρ/(ρ + 2w‖c‖²) = 1/3.
        assert!(close(term.x[0] + term.x[1], 1.0 / 3.0));
        assert!(close(term.x[0], term.x[1]));
    }

    #[test]
    fn constraints_project_when_violated() {
        let mut term = local(
            TermKind::Constraint(Comparator::LessThanEqual),
            vec![1.0, 1.0],
            1.0,
            &[0.25, 0.5],
        );
        term.update(&[0.25, 0.5], 1.0);
        assert_eq!(term.x, vec![0.25, 0.5]);

        let mut term = local(
            TermKind::Constraint(Comparator::Equal),
            vec![1.0, 1.0],
            1.0,
            &[0.25, 0.25],
        );
        term.update(&[0.25, 0.25], 1.0);
        assert!(close(term.x[0], 0.5));
        assert!(close(term.x[1], 0.5));
    }

    #[test]
    fn multipliers_track_disagreement() {
        let mut term = local(TermKind::Linear, vec![1.0], 0.0, &[0.5]);
        term.update(&[0.5], 1.0);
        assert!(close(term.x[0], -0.5));

        // x − z = −1 at the second update.
        term.update(&[0.5], 1.0);
        assert!(close(term.y[0], -1.0));
        assert!(close(term.x[0], 0.5));
    }
}
