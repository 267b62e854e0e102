//! Tolerances used when comparing floating point values.

/// The default tolerance.
pub const EPSILON: f64 = 1e-6;

/// A tolerance for comparisons where some error is expected, e.g. on the output of an iterative method.
pub const RELAXED_EPSILON: f64 = 5e-3;

/// A tolerance for comparisons which should be all but exact.
pub const STRICT_EPSILON: f64 = 1e-8;

/// Whether `value` is zero, to within `epsilon`.
pub fn is_zero(value: f64, epsilon: f64) -> bool {
    value.abs() <= epsilon
}

/// Whether `a` and `b` are equal, to within `epsilon`.
pub fn equals(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Clamps a value to the unit interval.
pub fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}
