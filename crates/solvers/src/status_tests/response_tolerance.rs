use std::fmt;

use braid_core::{Error, SolveStatus, Solver, StatusTest};

use super::write_line;

/// Converges when a scalar response stops changing between checks.
///
/// The scalar is the first entry of the named response of the named model.
/// The test converges when `|current - previous| <= tolerance * |current|`.
/// The first check after construction or reset has nothing to compare with
/// and is always unconverged.
#[derive(Debug, Clone)]
pub struct ScalarResponseRelativeTolerance {
    model: String,
    response: String,
    tolerance: f64,
    previous: Option<f64>,
    current: Option<f64>,
    status: SolveStatus,
}

impl ScalarResponseRelativeTolerance {
    pub fn new(model: impl Into<String>, response: impl Into<String>, tolerance: f64) -> Self {
        Self {
            model: model.into(),
            response: response.into(),
            tolerance,
            previous: None,
            current: None,
            status: SolveStatus::Unchecked,
        }
    }

    /// Returns the relative change seen by the last check.
    fn relative_change(&self) -> f64 {
        match (self.previous, self.current) {
            (Some(previous), Some(current)) => (current - previous).abs() / current.abs(),
            _ => f64::NAN,
        }
    }
}

impl StatusTest for ScalarResponseRelativeTolerance {
    fn check_status(&mut self, solver: &dyn Solver) -> Result<SolveStatus, Error> {
        let handle = solver.model_evaluator(&self.model)?;
        let current = {
            let model = handle.borrow();
            let index = model.response_index(&self.response)?;
            model.response(index)?.first().copied().unwrap_or(f64::NAN)
        };

        self.previous = self.current.replace(current);
        self.status = match self.previous {
            Some(previous) if (current - previous).abs() <= self.tolerance * current.abs() => {
                SolveStatus::Converged
            }
            _ => SolveStatus::Unconverged,
        };
        Ok(self.status)
    }

    fn status(&self) -> SolveStatus {
        self.status
    }

    fn reset(&mut self) {
        self.previous = None;
        self.current = None;
        self.status = SolveStatus::Unchecked;
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write_line(
            f,
            indent,
            self.status,
            format_args!(
                "Relative change of \"{}\" in \"{}\" = {:e} <= {:e}",
                self.response,
                self.model,
                self.relative_change(),
                self.tolerance
            ),
        )
    }
}
