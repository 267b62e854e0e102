//! The dual state of a variable.
//!
//! Each variable has dual variables for its lower (zero) and upper (one) bounds, and a *message*, the sum of every dual variable the variable appears in, scaled by its coefficient.
//! The primal value of the variable is recovered from the message alone.

use std::sync::Mutex;

use crate::generic::numeric;

/// The dual state of a variable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DualAtom {
    pub message: f64,
    pub lower: f64,
    pub upper: f64,
}

impl DualAtom {
    /// `−message/(2λ)`
    pub fn primal(&self, regularization: f64) -> f32 {
        (-self.message / (2.0 * regularization)) as f32
    }

    pub fn lower_partial(&self, regularization: f64) -> f64 {
        let partial = -self.message / regularization;
        match partial > 0.0 && numeric::is_zero(self.lower, numeric::STRICT_EPSILON) {
            true => 0.0,
            false => partial,
        }
    }

    pub fn upper_partial(&self, regularization: f64) -> f64 {
        let partial = self.message / regularization + 2.0;
        match partial > 0.0 && numeric::is_zero(self.upper, numeric::STRICT_EPSILON) {
            true => 0.0,
            false => partial,
        }
    }

    fn set_lower(&mut self, lower: f64) {
        self.message -= lower - self.lower;
        self.lower = lower;
    }

    fn set_upper(&mut self, upper: f64) {
        self.message += upper - self.upper;
        self.upper = upper;
    }

    /// Updates the message by the change to the dual variable of some term, and steps the bound dual variables.
    pub fn update(&mut self, delta: f64, coefficient: f64, regularization: f64, step: f64) {
        let lower_partial = self.lower_partial(regularization);
        let upper_partial = self.upper_partial(regularization);

        self.message += delta * coefficient;

        self.set_lower((self.lower - step * lower_partial).max(0.0));
        self.set_upper((self.upper - step * upper_partial).max(0.0));
    }

    pub fn lower_objective(&self, regularization: f64) -> f64 {
        -self.message * self.lower / (2.0 * regularization)
    }

    pub fn upper_objective(&self, regularization: f64) -> f64 {
        self.message * self.upper / (2.0 * regularization) + 2.0 * self.upper
    }
}

/// Access to the dual state of variables, by position.
pub trait DualAtomStore {
    /// A copy of the state of the variable.
    fn state(&self, position: usize) -> DualAtom;

    /// See [DualAtom::update].
    fn update(&mut self, position: usize, delta: f64, coefficient: f64, regularization: f64, step: f64);
}

impl DualAtomStore for [DualAtom] {
    fn state(&self, position: usize) -> DualAtom {
        self[position]
    }

    fn update(&mut self, position: usize, delta: f64, coefficient: f64, regularization: f64, step: f64) {
        self[position].update(delta, coefficient, regularization, step);
    }
}

/// Variables shared between threads, each behind a lock.
#[derive(Clone, Copy)]
pub struct Locked<'a>(pub &'a [Mutex<DualAtom>]);

impl DualAtomStore for Locked<'_> {
    fn state(&self, position: usize) -> DualAtom {
        *self.0[position].lock().unwrap_or_else(|poison| poison.into_inner())
    }

    fn update(&mut self, position: usize, delta: f64, coefficient: f64, regularization: f64, step: f64) {
        self.0[position]
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .update(delta, coefficient, regularization, step);
    }
}
