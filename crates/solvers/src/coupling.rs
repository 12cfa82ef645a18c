//! Fixed-point coupling solvers.
//!
//! A [`CouplingSolver`] pairs the shared driver with a [`CouplingStrategy`]
//! that decides the order in which models are solved and data is exchanged
//! during one step. Two strategies are provided:
//!
//! - [`GaussSeidel`]: sequential; registration order is part of the result
//! - [`Jacobi`]: simultaneous; every model sees the previous exchange only

mod gauss_seidel;
mod jacobi;

pub use gauss_seidel::GaussSeidel;
pub use jacobi::Jacobi;

use braid_core::{
    Error, ModelHandle, ObserverHandle, ParameterList, SolveStatus, Solver, StatusTest,
    TransferHandle,
};

use crate::base::{self, Driven, SolverBase, StepOutcome};

/// Block Gauss-Seidel coupling.
pub type BlockGaussSeidel = CouplingSolver<GaussSeidel>;

/// Block Jacobi coupling.
pub type BlockJacobi = CouplingSolver<Jacobi>;

/// The per-step update of a fixed-point coupling scheme.
///
/// This is the only piece a new coupling algorithm has to supply; iteration
/// bookkeeping, status testing, and observer notification are handled by
/// [`CouplingSolver`].
pub trait CouplingStrategy {
    /// The solver `"Type"` this strategy is configured as.
    fn type_name(&self) -> &'static str;

    /// Prepares for stepping once the registered entities are final.
    ///
    /// # Errors
    ///
    /// Returns an error if the registered entities cannot be scheduled.
    fn complete_registration(
        &mut self,
        models: &[ModelHandle],
        transfers: &[TransferHandle],
    ) -> Result<(), Error> {
        let _ = (models, transfers);
        Ok(())
    }

    /// Solves the models and runs the transfers for one step.
    ///
    /// A model whose solve returns `false` must end the step with
    /// [`StepOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns an error raised by a model or transfer.
    fn step(
        &mut self,
        models: &[ModelHandle],
        transfers: &[TransferHandle],
    ) -> Result<StepOutcome, Error>;
}

/// A solver that iterates a [`CouplingStrategy`] to a fixed point.
pub struct CouplingSolver<A> {
    base: SolverBase,
    strategy: A,
}

impl<A: CouplingStrategy> CouplingSolver<A> {
    /// Creates an unconfigured solver using `strategy`.
    pub fn new(strategy: A) -> Self {
        Self {
            base: SolverBase::default(),
            strategy,
        }
    }

    pub fn strategy(&self) -> &A {
        &self.strategy
    }
}

impl<A: CouplingStrategy + Default> Default for CouplingSolver<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

impl<A: CouplingStrategy> Driven for CouplingSolver<A> {
    fn base(&self) -> &SolverBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SolverBase {
        &mut self.base
    }

    fn step_implementation(&mut self) -> Result<StepOutcome, Error> {
        self.strategy.step(&self.base.models, &self.base.transfers)
    }

    fn finish_registration(&mut self) -> Result<(), Error> {
        self.strategy
            .complete_registration(&self.base.models, &self.base.transfers)
    }
}

impl<A: CouplingStrategy> Solver for CouplingSolver<A> {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn register_model_evaluator(&mut self, model: ModelHandle) -> Result<(), Error> {
        self.base.register_model(model)
    }

    fn register_data_transfer(&mut self, transfer: TransferHandle) -> Result<(), Error> {
        self.base.register_transfer(transfer)
    }

    fn complete_registration(&mut self) -> Result<(), Error> {
        base::complete_registration(self)
    }

    fn is_registration_complete(&self) -> bool {
        self.base.registration_complete
    }

    fn model_evaluators(&self) -> Vec<ModelHandle> {
        self.base.models.clone()
    }

    fn data_transfers(&self) -> Vec<TransferHandle> {
        self.base.transfers.clone()
    }

    fn step(&mut self) -> Result<SolveStatus, Error> {
        base::step(self)
    }

    fn solve(&mut self) -> Result<SolveStatus, Error> {
        base::solve(self)
    }

    fn reset(&mut self) {
        self.base.reset();
    }

    fn status(&self) -> SolveStatus {
        self.base.status
    }

    fn number_of_iterations(&self) -> usize {
        self.base.iterations
    }

    fn add_observer(&mut self, observer: ObserverHandle) {
        self.base.observers.push(observer);
    }

    fn observers(&self) -> Vec<ObserverHandle> {
        self.base.observers.clone()
    }

    fn set_status_tests(&mut self, tests: Box<dyn StatusTest>) {
        self.base.status_tests = Some(tests);
    }

    fn status_tests(&self) -> Option<&dyn StatusTest> {
        self.base.status_tests.as_deref()
    }

    fn set_parameter_list(&mut self, list: ParameterList) -> Result<(), Error> {
        let valid = SolverBase::valid_parameters(self.strategy.type_name());
        let list = SolverBase::validate(list, &valid)?;
        self.base.store(list)?;
        Ok(())
    }

    fn parameter_list(&self) -> Option<&ParameterList> {
        self.base.params.as_ref()
    }

    fn valid_parameters(&self) -> ParameterList {
        self.base
            .params
            .clone()
            .unwrap_or_else(|| SolverBase::valid_parameters(self.strategy.type_name()))
    }
}
