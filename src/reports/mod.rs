/*!
Reports for the context.
*/

/// High-level reports regarding inference.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Report {
    /// The stopping criteria of the reasoner were met.
    Converged,

    /// The reasoner stopped at the maximum number of iterations.
    MaxIterations,

    /// Inference has not taken place, or the result of inference is unknown for some other reason.
    Unknown,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Converged => write!(f, "Converged"),
            Self::MaxIterations => write!(f, "MaxIterations"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
