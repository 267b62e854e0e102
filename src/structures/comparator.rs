/// A comparison of some linear function against zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparator {
    LessThanEqual,
    GreaterThanEqual,
    Equal,
}

impl Comparator {
    /// How far `value` is from satisfying `value ⋈ 0`, where ⋈ is the comparator.
    pub fn violation(&self, value: f64) -> f64 {
        match self {
            Self::LessThanEqual => value.max(0.0),
            Self::GreaterThanEqual => (-value).max(0.0),
            Self::Equal => value.abs(),
        }
    }

    /// Whether `value ⋈ 0` holds to within `tolerance`.
    pub fn holds(&self, value: f64, tolerance: f64) -> bool {
        self.violation(value) <= tolerance
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LessThanEqual => write!(f, "<="),
            Self::GreaterThanEqual => write!(f, ">="),
            Self::Equal => write!(f, "="),
        }
    }
}

#[cfg(test)]
mod comparator_tests {
    use super::*;

    #[test]
    fn violations() {
        assert_eq!(Comparator::LessThanEqual.violation(-0.5), 0.0);
        assert_eq!(Comparator::LessThanEqual.violation(0.5), 0.5);
        assert_eq!(Comparator::GreaterThanEqual.violation(-0.5), 0.5);
        assert_eq!(Comparator::Equal.violation(-0.25), 0.25);
        assert!(Comparator::Equal.holds(1e-9, 1e-8));
    }
}
