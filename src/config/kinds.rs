use std::str::FromStr;

/// Variant reasoners to use during inference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReasonerKind {
    /// Consensus optimisation by the alternating direction method of multipliers.
    ADMM = 0,

    /// Block coordinate descent on the dual of a regularised problem, over connected components.
    DualBCD,

    /// Block coordinate descent on the dual of a regularised problem, over contiguous blocks of terms without synchronisation between blocks.
    DistributedDualBCD,

    /// Local search over boolean assignments.
    MaxWalkSat,

    /// Gibbs sampling of boolean assignments, with values set to marginals.
    MCSat,
}

impl std::fmt::Display for ReasonerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ADMM => write!(f, "ADMM"),
            Self::DualBCD => write!(f, "DualBCD"),
            Self::DistributedDualBCD => write!(f, "DistributedDualBCD"),
            Self::MaxWalkSat => write!(f, "MaxWalkSat"),
            Self::MCSat => write!(f, "MCSat"),
        }
    }
}

impl ReasonerKind {
    /// The minimum ReasonerKind.
    pub const MIN: ReasonerKind = ReasonerKind::ADMM;

    /// The maximum ReasonerKind.
    pub const MAX: ReasonerKind = ReasonerKind::MCSat;
}

impl FromStr for ReasonerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMM" => Ok(Self::ADMM),
            "DualBCD" => Ok(Self::DualBCD),
            "DistributedDualBCD" => Ok(Self::DistributedDualBCD),
            "MaxWalkSat" => Ok(Self::MaxWalkSat),
            "MCSat" => Ok(Self::MCSat),

            _unkown_string => Err(()),
        }
    }
}

/// The values with which a reasoner begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum InitialValue {
    /// The current value of the atom.
    Atom = 0,

    /// Zero.
    Zero,

    /// Some random value.
    Random,
}

impl std::fmt::Display for InitialValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atom => write!(f, "Atom"),
            Self::Zero => write!(f, "Zero"),
            Self::Random => write!(f, "Random"),
        }
    }
}

impl InitialValue {
    /// The minimum InitialValue.
    pub const MIN: InitialValue = InitialValue::Atom;

    /// The maximum InitialValue.
    pub const MAX: InitialValue = InitialValue::Random;

    /// The initial value of some atom with the given current value.
    pub fn value<R: rand::Rng>(&self, current: f32, rng: &mut R) -> f32 {
        match self {
            Self::Atom => current,
            Self::Zero => 0.0,
            Self::Random => rng.random::<f32>(),
        }
    }
}

impl FromStr for InitialValue {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Atom" => Ok(Self::Atom),
            "Zero" => Ok(Self::Zero),
            "Random" => Ok(Self::Random),

            _unkown_string => Err(()),
        }
    }
}
