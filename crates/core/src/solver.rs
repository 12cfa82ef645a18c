use std::{cell::RefCell, rc::Rc};

use crate::{
    Error, ModelHandle, ObserverHandle, ParameterList, SolveStatus, StatusTest, TransferHandle,
};

/// A shared handle to a solver.
pub type SolverHandle = Rc<RefCell<dyn Solver>>;

/// A coupling solver: the step/solve state machine over registered models.
///
/// # Lifecycle
///
/// 1. Construct and configure ([`set_parameter_list`](Solver::set_parameter_list)).
/// 2. Register models, transfers, observers, and status tests.
/// 3. Call [`complete_registration`](Solver::complete_registration) exactly once.
/// 4. [`solve`](Solver::solve), [`step`](Solver::step), and
///    [`reset`](Solver::reset) as often as needed.
///
/// Registered model and transfer lists are append-only until registration is
/// complete and frozen afterwards.
pub trait Solver {
    /// Returns the solver's diagnostic name (the `"Name"` option).
    fn name(&self) -> &str;

    /// Appends a model evaluator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistrationClosed`] once registration is complete.
    fn register_model_evaluator(&mut self, model: ModelHandle) -> Result<(), Error>;

    /// Appends a data transfer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistrationClosed`] once registration is complete.
    fn register_data_transfer(&mut self, transfer: TransferHandle) -> Result<(), Error>;

    /// Finalizes registration, applying default options if none were set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistrationAlreadyComplete`] on a second call, or an
    /// error from algorithm-specific setup.
    fn complete_registration(&mut self) -> Result<(), Error>;

    fn is_registration_complete(&self) -> bool;

    /// Looks up a registered model by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownModel`], listing the valid names, if no model
    /// has that name.
    fn model_evaluator(&self, name: &str) -> Result<ModelHandle, Error> {
        let models = self.model_evaluators();
        models
            .iter()
            .find(|m| m.borrow().name() == name)
            .cloned()
            .ok_or_else(|| Error::UnknownModel {
                name: name.to_owned(),
                valid: models.iter().map(|m| m.borrow().name().to_owned()).collect(),
            })
    }

    /// Returns the registered models in registration order.
    fn model_evaluators(&self) -> Vec<ModelHandle>;

    /// Looks up a registered data transfer by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTransfer`], listing the valid names, if no
    /// transfer has that name.
    fn data_transfer(&self, name: &str) -> Result<TransferHandle, Error> {
        let transfers = self.data_transfers();
        transfers
            .iter()
            .find(|t| t.borrow().name() == name)
            .cloned()
            .ok_or_else(|| Error::UnknownTransfer {
                name: name.to_owned(),
                valid: transfers
                    .iter()
                    .map(|t| t.borrow().name().to_owned())
                    .collect(),
            })
    }

    /// Returns the registered transfers in registration order.
    fn data_transfers(&self) -> Vec<TransferHandle>;

    /// Takes one coupling iteration and returns the new status.
    ///
    /// # Errors
    ///
    /// Returns an error if a model, transfer, or status test raises one.
    fn step(&mut self) -> Result<SolveStatus, Error>;

    /// Steps until the status is `Converged` or `Failed`.
    ///
    /// There is no built-in iteration limit: bounding the loop is the job of
    /// the status tests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistrationIncomplete`] if registration has not been
    /// completed, or any error raised while stepping.
    fn solve(&mut self) -> Result<SolveStatus, Error>;

    /// Zeroes the iteration count, resets the status tests, and returns the
    /// status to `Unchecked`. Registered entities are kept.
    fn reset(&mut self);

    fn status(&self) -> SolveStatus;

    fn number_of_iterations(&self) -> usize;

    /// Adds an observer, notified after all previously added observers.
    fn add_observer(&mut self, observer: ObserverHandle);

    fn observers(&self) -> Vec<ObserverHandle>;

    fn set_status_tests(&mut self, tests: Box<dyn StatusTest>);

    fn status_tests(&self) -> Option<&dyn StatusTest>;

    /// Validates `list`, fills in defaults, and applies it.
    ///
    /// # Errors
    ///
    /// Returns an error if `list` has unknown keys or mistyped values.
    fn set_parameter_list(&mut self, list: ParameterList) -> Result<(), Error>;

    /// Returns the applied options, including defaults, if any were set.
    fn parameter_list(&self) -> Option<&ParameterList>;

    /// Returns every option this solver accepts, valued with its current
    /// effective setting.
    fn valid_parameters(&self) -> ParameterList;

    /// Returns true if every registered model reports global convergence.
    fn is_globally_converged(&self) -> bool {
        self.model_evaluators()
            .iter()
            .all(|m| m.borrow().is_globally_converged())
    }
}
