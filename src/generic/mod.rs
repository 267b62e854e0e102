//! Generic structures and methods.

pub mod numeric;
pub mod parallel;
pub mod random;
