use std::fmt;

/// A solver lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    BeginSolve,
    EndSolve,
    BeginStep,
    EndStep,
    ConvergedSolve,
    FailedSolve,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::BeginSolve => "begin solve",
            Self::EndSolve => "end solve",
            Self::BeginStep => "begin step",
            Self::EndStep => "end step",
            Self::ConvergedSolve => "converged solve",
            Self::FailedSolve => "failed solve",
        })
    }
}
