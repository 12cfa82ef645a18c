use std::fmt;

/// The convergence state of a solver or status test.
///
/// `Converged` and `Failed` are terminal outcomes of a solve, not errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Not yet checked since construction or the last reset.
    #[default]
    Unchecked,

    /// Checked, and neither converged nor failed.
    Unconverged,

    /// Terminal success.
    Converged,

    /// Terminal failure.
    Failed,
}

impl SolveStatus {
    /// Returns true for `Converged` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Converged | Self::Failed)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unchecked => "UNCHECKED",
            Self::Unconverged => "UNCONVERGED",
            Self::Converged => "CONVERGED",
            Self::Failed => "FAILED",
        };
        f.pad(label)
    }
}
