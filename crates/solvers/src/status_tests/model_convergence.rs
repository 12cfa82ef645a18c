use std::fmt;

use braid_core::{Error, SolveStatus, Solver, StatusTest};

use super::write_line;

/// Defines a status test that inspects one named model.
macro_rules! model_test {
    ($(#[$doc:meta])* $name:ident, $label:literal, |$model:ident| $verdict:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            model: String,
            status: SolveStatus,
        }

        impl $name {
            pub fn new(model: impl Into<String>) -> Self {
                Self {
                    model: model.into(),
                    status: SolveStatus::Unchecked,
                }
            }

            #[must_use]
            pub fn model_name(&self) -> &str {
                &self.model
            }
        }

        impl StatusTest for $name {
            fn check_status(&mut self, solver: &dyn Solver) -> Result<SolveStatus, Error> {
                let handle = solver.model_evaluator(&self.model)?;
                let $model = handle.borrow();
                self.status = $verdict;
                Ok(self.status)
            }

            fn status(&self) -> SolveStatus {
                self.status
            }

            fn reset(&mut self) {
                self.status = SolveStatus::Unchecked;
            }

            fn describe(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
                write_line(
                    f,
                    indent,
                    self.status,
                    format_args!("{} for \"{}\"", $label, self.model),
                )
            }
        }
    };
}

model_test!(
    /// Converges when the named model's last solve converged.
    LocalModelConvergence,
    "Local Model Convergence",
    |model| if model.is_locally_converged() {
        SolveStatus::Converged
    } else {
        SolveStatus::Unconverged
    }
);

model_test!(
    /// Fails the solve when the named model's last solve did not converge.
    LocalModelFailure,
    "Local Model Failure",
    |model| if model.is_locally_converged() {
        SolveStatus::Unconverged
    } else {
        SolveStatus::Failed
    }
);

model_test!(
    /// Converges when the named model reports the coupled problem converged.
    GlobalModelConvergence,
    "Global Model Convergence",
    |model| if model.is_globally_converged() {
        SolveStatus::Converged
    } else {
        SolveStatus::Unconverged
    }
);
