//! A status test that converges after a fixed number of steps.

use std::fmt;

use braid_core::{Error, SolveStatus, Solver, StatusTest};

/// Converges once the solver has taken `steps` steps.
///
/// Useful for inner solvers whose models converge in a single pass.
#[derive(Debug, Clone)]
pub struct ConvergeAfter {
    steps: usize,
    status: SolveStatus,
}

impl ConvergeAfter {
    #[must_use]
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            status: SolveStatus::Unchecked,
        }
    }
}

impl StatusTest for ConvergeAfter {
    fn check_status(&mut self, solver: &dyn Solver) -> Result<SolveStatus, Error> {
        self.status = if solver.number_of_iterations() >= self.steps {
            SolveStatus::Converged
        } else {
            SolveStatus::Unconverged
        };
        Ok(self.status)
    }

    fn status(&self) -> SolveStatus {
        self.status
    }

    fn reset(&mut self) {
        self.status = SolveStatus::Unchecked;
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{:<11} Converge after {} steps", "", self.status, self.steps)
    }
}
