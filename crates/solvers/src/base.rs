//! Shared bookkeeping and the step/solve driver loop.
//!
//! [`SolverBase`] holds everything every solver tracks (registered entities,
//! observers, status tests, options, iteration count, and status). The free
//! functions in this module implement the driver for any type that exposes a
//! base and a per-step update through [`Driven`].

use braid_core::{
    ConfigError, EntityKind, Error, ModelHandle, ObserverHandle, ParameterList, SolveStatus,
    Solver, SolverObserver, StatusTest, TransferHandle,
};

/// Target of the status renderings controlled by the print options.
const STATUS_TARGET: &str = "braid::status";

pub(crate) const TYPE: &str = "Type";
pub(crate) const NAME: &str = "Name";
pub(crate) const PRINT_BEGIN: &str = "Print Begin Solve Status";
pub(crate) const PRINT_STEP: &str = "Print Step Status";
pub(crate) const PRINT_END: &str = "Print End Solve Status";
pub(crate) const STATUS_TEST_SUBLIST: &str = "Status Test Sublist";

/// The result of one per-step update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The update ran; the status tests decide the new status.
    Continue,

    /// The algorithm has nothing left to do; the solve is converged unless
    /// the status tests report a failure.
    Finished,

    /// A model or inner solver failed; the solve is failed.
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct PrintFlags {
    begin: bool,
    step: bool,
    end: bool,
}

impl Default for PrintFlags {
    fn default() -> Self {
        Self {
            begin: true,
            step: true,
            end: true,
        }
    }
}

/// State shared by every solver.
#[derive(Default)]
pub(crate) struct SolverBase {
    pub(crate) name: String,
    pub(crate) status: SolveStatus,
    pub(crate) iterations: usize,
    pub(crate) models: Vec<ModelHandle>,
    pub(crate) transfers: Vec<TransferHandle>,
    pub(crate) observers: Vec<ObserverHandle>,
    pub(crate) status_tests: Option<Box<dyn StatusTest>>,
    pub(crate) params: Option<ParameterList>,
    pub(crate) registration_complete: bool,
    print: PrintFlags,
}

impl SolverBase {
    /// Returns the options every solver accepts, with their defaults.
    pub(crate) fn valid_parameters(type_name: &str) -> ParameterList {
        ParameterList::new()
            .with(TYPE, type_name)
            .with(NAME, "")
            .with(PRINT_BEGIN, true)
            .with(PRINT_STEP, true)
            .with(PRINT_END, true)
            .with(STATUS_TEST_SUBLIST, "")
    }

    /// Validates `list` against `valid` and applies the shared options.
    ///
    /// Returns the completed list for the caller to apply its own options
    /// from before storing it with [`SolverBase::store`].
    pub(crate) fn validate(
        mut list: ParameterList,
        valid: &ParameterList,
    ) -> Result<ParameterList, ConfigError> {
        list.validate_and_set_defaults(valid)?;

        let expected = valid.get_str(TYPE)?;
        let found = list.get_str(TYPE)?;
        if found != expected {
            return Err(ConfigError::InvalidValue {
                key: TYPE.to_owned(),
                reason: format!("this solver is a \"{expected}\", not a \"{found}\""),
            });
        }

        Ok(list)
    }

    pub(crate) fn store(&mut self, list: ParameterList) -> Result<(), ConfigError> {
        self.name = list.get_str(NAME)?.to_owned();
        self.print = PrintFlags {
            begin: list.get_bool(PRINT_BEGIN)?,
            step: list.get_bool(PRINT_STEP)?,
            end: list.get_bool(PRINT_END)?,
        };
        self.params = Some(list);
        Ok(())
    }

    pub(crate) fn register_model(&mut self, model: ModelHandle) -> Result<(), Error> {
        if self.registration_complete {
            return Err(Error::RegistrationClosed {
                kind: EntityKind::ModelEvaluator,
                name: model.borrow().name().to_owned(),
            });
        }
        self.models.push(model);
        Ok(())
    }

    pub(crate) fn register_transfer(&mut self, transfer: TransferHandle) -> Result<(), Error> {
        if self.registration_complete {
            return Err(Error::RegistrationClosed {
                kind: EntityKind::DataTransfer,
                name: transfer.borrow().name().to_owned(),
            });
        }
        self.transfers.push(transfer);
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.iterations = 0;
        self.status = SolveStatus::Unchecked;
        if let Some(tests) = self.status_tests.as_mut() {
            tests.reset();
        }
    }

    fn render(&self, heading: &str) {
        let tree = self
            .status_tests
            .as_deref()
            .map(ToString::to_string)
            .unwrap_or_default();
        if self.name.is_empty() {
            tracing::info!(target: STATUS_TARGET, status = %self.status, "** {heading} **\n{tree}");
        } else {
            tracing::info!(
                target: STATUS_TARGET,
                status = %self.status,
                "** {}: {heading} **\n{tree}",
                self.name
            );
        }
    }
}

/// A solver driven by the shared step/solve loop.
pub(crate) trait Driven: Solver + Sized {
    fn base(&self) -> &SolverBase;

    fn base_mut(&mut self) -> &mut SolverBase;

    /// The algorithm-specific part of a step.
    fn step_implementation(&mut self) -> Result<StepOutcome, Error>;

    /// Algorithm-specific setup run once by `complete_registration`.
    fn finish_registration(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Whether `solve` may run without status tests.
    fn requires_status_tests(&self) -> bool {
        true
    }
}

fn notify<S: Driven>(solver: &S, callback: impl Fn(&mut dyn SolverObserver, &dyn Solver)) {
    let observers = &solver.base().observers;
    let solver: &dyn Solver = solver;
    for observer in observers {
        callback(&mut *observer.borrow_mut(), solver);
    }
}

/// Evaluates the status tests against the solver.
///
/// The tests are moved out of the base for the duration of the check, so a
/// test sees `status_tests() == None` on the solver it inspects.
fn check_status<S: Driven>(solver: &mut S) -> Result<SolveStatus, Error> {
    let Some(mut tests) = solver.base_mut().status_tests.take() else {
        return Ok(SolveStatus::Unconverged);
    };
    let result = tests.check_status(&*solver);
    solver.base_mut().status_tests = Some(tests);
    result
}

pub(crate) fn complete_registration<S: Driven>(solver: &mut S) -> Result<(), Error> {
    if solver.base().registration_complete {
        return Err(Error::RegistrationAlreadyComplete);
    }
    if solver.base().params.is_none() {
        solver.set_parameter_list(ParameterList::new())?;
    }
    solver.finish_registration()?;
    solver.base_mut().registration_complete = true;

    let base = solver.base();
    tracing::debug!(
        solver = %base.name,
        models = base.models.len(),
        transfers = base.transfers.len(),
        "registration complete"
    );
    Ok(())
}

pub(crate) fn step<S: Driven>(solver: &mut S) -> Result<SolveStatus, Error> {
    if !solver.base().registration_complete {
        return Err(Error::RegistrationIncomplete {
            solver: solver.base().name.clone(),
        });
    }

    notify(solver, |o, s| o.observe_begin_step(s));

    let outcome = solver.step_implementation()?;
    solver.base_mut().iterations += 1;

    let tested = check_status(solver)?;
    let status = match outcome {
        StepOutcome::Continue => tested,
        StepOutcome::Finished if tested == SolveStatus::Failed => SolveStatus::Failed,
        StepOutcome::Finished => SolveStatus::Converged,
        StepOutcome::Failed => SolveStatus::Failed,
    };

    let base = solver.base_mut();
    base.status = status;
    if base.print.step {
        base.render(&format!("Step {} Status", base.iterations));
    }

    notify(solver, |o, s| o.observe_end_step(s));
    Ok(status)
}

pub(crate) fn solve<S: Driven>(solver: &mut S) -> Result<SolveStatus, Error> {
    let base = solver.base();
    if !base.registration_complete {
        return Err(Error::RegistrationIncomplete {
            solver: base.name.clone(),
        });
    }
    if base.status_tests.is_none() && solver.requires_status_tests() {
        return Err(Error::MissingStatusTests {
            solver: base.name.clone(),
        });
    }

    notify(solver, |o, s| o.observe_begin_solve(s));

    // A solve may already be converged before the first step.
    let status = check_status(solver)?;
    let base = solver.base_mut();
    base.status = status;
    if base.print.begin {
        base.render("Begin Solve Status");
    }

    while !solver.base().status.is_terminal() {
        step(solver)?;
    }

    let base = solver.base();
    if base.print.end {
        base.render("End Solve Status");
    }

    notify(solver, |o, s| o.observe_end_solve(s));
    let status = solver.base().status;
    match status {
        SolveStatus::Converged => notify(solver, |o, s| o.observe_converged_solve(s)),
        SolveStatus::Failed => notify(solver, |o, s| o.observe_failed_solve(s)),
        SolveStatus::Unchecked | SolveStatus::Unconverged => {}
    }

    Ok(status)
}
