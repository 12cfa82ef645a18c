//! An outer time-stepping loop around an inner coupled solve.
//!
//! Each outer step advances time by one increment and runs a full inner
//! `reset()` + `solve()`. The stepper converges once the end time is reached
//! with every increment converged; a single unconverged increment fails it.
//!
//! ```text
//! t = begin
//! while t < end:
//!     dt_n = min(dt, end - t)
//!     inner.reset(); inner.solve()   // must converge
//!     t += dt_n
//! ```

use std::rc::Rc;

use braid_core::{
    ConfigError, Error, ModelHandle, ObserverHandle, ParameterList, SolveStatus, Solver,
    SolverHandle, StatusTest, TransferHandle,
};

use crate::base::{self, Driven, SolverBase, StepOutcome};

pub(crate) const TYPE_NAME: &str = "Transient Stepper";
pub(crate) const INTERNAL_SOLVER: &str = "Internal Solver Sublist";
const BEGIN_TIME: &str = "Begin Time";
const END_TIME: &str = "End Time";
const TIME_STEP_SIZE: &str = "Time Step Size";
const MAX_TIME_STEPS: &str = "Maximum Number of Time Steps";

/// Fraction of a time step below which a remainder is treated as round-off.
const ROUND_OFF: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Schedule {
    begin: f64,
    end: f64,
    dt: f64,
    steps: usize,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            begin: 0.0,
            end: 1.0,
            dt: 1.0,
            steps: 1,
        }
    }
}

impl Schedule {
    fn from_list(list: &ParameterList) -> Result<Self, ConfigError> {
        let begin = list.get_f64(BEGIN_TIME)?;
        let end = list.get_f64(END_TIME)?;
        let dt = list.get_f64(TIME_STEP_SIZE)?;
        let max_steps = list.get_usize(MAX_TIME_STEPS)?;

        if !(dt > 0.0 && dt.is_finite()) {
            return Err(ConfigError::InvalidValue {
                key: TIME_STEP_SIZE.to_owned(),
                reason: format!("must be positive and finite, got {dt}"),
            });
        }
        if !(begin.is_finite() && end.is_finite()) || end <= begin {
            return Err(ConfigError::InvalidValue {
                key: END_TIME.to_owned(),
                reason: format!("must be finite and after the begin time {begin}, got {end}"),
            });
        }

        let count = ((end - begin) / dt - ROUND_OFF).ceil();
        #[allow(clippy::cast_precision_loss)]
        let limit = max_steps as f64;
        if count > limit {
            return Err(ConfigError::InvalidValue {
                key: MAX_TIME_STEPS.to_owned(),
                reason: format!("{count} time steps are needed but at most {max_steps} are allowed"),
            });
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = count.max(1.0) as usize;
        Ok(Self {
            begin,
            end,
            dt,
            steps,
        })
    }

    fn reached_end(&self, time: f64) -> bool {
        self.end - time <= ROUND_OFF * self.dt
    }
}

/// Repeats a full inner solve once per time increment.
///
/// Models and transfers registered with the stepper are registered with the
/// inner solver, and lookups are answered by it. Status tests are optional:
/// without them the stepper runs until the end time or the first failed
/// increment.
#[derive(Default)]
pub struct TransientStepper {
    base: SolverBase,
    inner: Option<SolverHandle>,
    schedule: Schedule,
    time: f64,
}

impl TransientStepper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the solver run at every time increment.
    pub fn set_solver(&mut self, solver: SolverHandle) {
        self.inner = Some(solver);
    }

    #[must_use]
    pub fn solver(&self) -> Option<SolverHandle> {
        self.inner.clone()
    }

    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.time
    }

    /// Returns the number of increments needed to reach the end time.
    #[must_use]
    pub fn number_of_time_steps(&self) -> usize {
        self.schedule.steps
    }

    #[must_use]
    pub fn time_step_size(&self) -> f64 {
        self.schedule.dt
    }

    fn valid_list() -> ParameterList {
        let defaults = Schedule::default();
        SolverBase::valid_parameters(TYPE_NAME)
            .with(INTERNAL_SOLVER, "")
            .with(BEGIN_TIME, defaults.begin)
            .with(END_TIME, defaults.end)
            .with(TIME_STEP_SIZE, defaults.dt)
            .with(MAX_TIME_STEPS, 1_000_000_i64)
    }

    fn inner(&self) -> Result<&SolverHandle, Error> {
        self.inner.as_ref().ok_or_else(|| Error::MissingInnerSolver {
            solver: self.base.name.clone(),
        })
    }

    fn transient_models(inner: &SolverHandle) -> Vec<ModelHandle> {
        inner
            .borrow()
            .model_evaluators()
            .into_iter()
            .filter(|m| m.borrow().is_transient())
            .collect()
    }
}

impl Driven for TransientStepper {
    fn base(&self) -> &SolverBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SolverBase {
        &mut self.base
    }

    fn step_implementation(&mut self) -> Result<StepOutcome, Error> {
        if self.schedule.reached_end(self.time) {
            return Ok(StepOutcome::Finished);
        }

        let inner = Rc::clone(self.inner()?);
        let dt = self.schedule.dt.min(self.schedule.end - self.time);
        let models = Self::transient_models(&inner);

        for model in &models {
            model.borrow_mut().set_next_time_step_size(dt);
        }

        let status = {
            let mut inner = inner.borrow_mut();
            inner.reset();
            inner.solve()?
        };
        if status != SolveStatus::Converged {
            tracing::warn!(
                solver = %self.base.name,
                time = self.time,
                dt,
                %status,
                "inner solve did not converge"
            );
            return Ok(StepOutcome::Failed);
        }

        for model in &models {
            model.borrow_mut().accept_time_step();
        }
        self.time += dt;
        tracing::debug!(solver = %self.base.name, time = self.time, "time step accepted");

        if self.schedule.reached_end(self.time) {
            self.time = self.schedule.end;
            Ok(StepOutcome::Finished)
        } else {
            Ok(StepOutcome::Continue)
        }
    }

    fn finish_registration(&mut self) -> Result<(), Error> {
        let inner = self.inner()?;
        if !inner.borrow().is_registration_complete() {
            inner.borrow_mut().complete_registration()?;
        }
        Ok(())
    }

    fn requires_status_tests(&self) -> bool {
        false
    }
}

impl Solver for TransientStepper {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn register_model_evaluator(&mut self, model: ModelHandle) -> Result<(), Error> {
        self.inner()?.borrow_mut().register_model_evaluator(model)
    }

    fn register_data_transfer(&mut self, transfer: TransferHandle) -> Result<(), Error> {
        self.inner()?.borrow_mut().register_data_transfer(transfer)
    }

    fn complete_registration(&mut self) -> Result<(), Error> {
        base::complete_registration(self)
    }

    fn is_registration_complete(&self) -> bool {
        self.base.registration_complete
    }

    fn model_evaluators(&self) -> Vec<ModelHandle> {
        self.inner
            .as_ref()
            .map(|s| s.borrow().model_evaluators())
            .unwrap_or_default()
    }

    fn data_transfers(&self) -> Vec<TransferHandle> {
        self.inner
            .as_ref()
            .map(|s| s.borrow().data_transfers())
            .unwrap_or_default()
    }

    fn step(&mut self) -> Result<SolveStatus, Error> {
        base::step(self)
    }

    fn solve(&mut self) -> Result<SolveStatus, Error> {
        base::solve(self)
    }

    /// Also rewinds time to the begin time.
    fn reset(&mut self) {
        self.base.reset();
        self.time = self.schedule.begin;
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
        let list = SolverBase::validate(list, &Self::valid_list())?;
        self.schedule = Schedule::from_list(&list)?;
        self.time = self.schedule.begin;
        self.base.store(list)?;
        Ok(())
    }

    fn parameter_list(&self) -> Option<&ParameterList> {
        self.base.params.as_ref()
    }

    fn valid_parameters(&self) -> ParameterList {
        self.base.params.clone().unwrap_or_else(Self::valid_list)
    }

    /// The stepper is globally converged once it has reached the end time
    /// with every increment converged.
    fn is_globally_converged(&self) -> bool {
        self.base.status == SolveStatus::Converged && self.schedule.reached_end(self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{cell::RefCell, rc::Rc};

    use approx::assert_relative_eq;
    use braid_core::ModelEvaluator;

    use crate::{
        BlockJacobi,
        test_utils::{ConvergeAfter, EventLog, Journal, handle, journal},
    };

    /// A transient model that records the step sizes it is given.
    struct Clock {
        journal: Journal,
        outputs: Vec<String>,
        fail_on: Option<usize>,
        solves: usize,
        pending: f64,
        accepted: Vec<f64>,
        converged: bool,
    }

    impl Clock {
        fn new(journal: &Journal) -> Self {
            Self {
                journal: Rc::clone(journal),
                outputs: vec!["time".into()],
                fail_on: None,
                solves: 0,
                pending: 0.0,
                accepted: Vec::new(),
                converged: false,
            }
        }
    }

    impl ModelEvaluator for Clock {
        fn name(&self) -> &str {
            "clock"
        }

        fn solve(&mut self) -> Result<bool, Error> {
            self.solves += 1;
            self.journal.borrow_mut().push(format!("solve dt={}", self.pending));
            self.converged = self.fail_on != Some(self.solves);
            Ok(self.converged)
        }

        fn is_locally_converged(&self) -> bool {
            self.converged
        }

        fn response_names(&self) -> &[String] {
            &self.outputs
        }

        fn response(&self, index: usize) -> Result<Vec<f64>, Error> {
            self.response_name(index)?;
            Ok(vec![self.accepted.iter().sum()])
        }

        fn is_transient(&self) -> bool {
            true
        }

        fn set_next_time_step_size(&mut self, dt: f64) {
            self.pending = dt;
        }

        fn accept_time_step(&mut self) {
            self.accepted.push(self.pending);
        }
    }

    fn stepper(
        clock: Clock,
        begin: f64,
        end: f64,
        dt: f64,
    ) -> (TransientStepper, Rc<RefCell<Clock>>) {
        let mut inner = BlockJacobi::default();
        inner.set_status_tests(Box::new(ConvergeAfter::new(1)));

        let mut stepper = TransientStepper::new();
        stepper.set_solver(handle(inner));
        stepper
            .set_parameter_list(
                ParameterList::new()
                    .with("Begin Time", begin)
                    .with("End Time", end)
                    .with("Time Step Size", dt),
            )
            .expect("valid schedule");

        let clock = handle(clock);
        stepper
            .register_model_evaluator(clock.clone())
            .expect("inner solver accepts models");
        stepper.complete_registration().expect("first completion");
        (stepper, clock)
    }

    #[test]
    fn runs_one_inner_solve_per_increment() {
        let journal = journal();
        let (mut stepper, clock) = stepper(Clock::new(&journal), 0.0, 1.0, 0.25);

        assert_eq!(stepper.number_of_time_steps(), 4);
        assert_eq!(stepper.solve().unwrap(), SolveStatus::Converged);

        assert_eq!(stepper.number_of_iterations(), 4);
        assert_eq!(journal.borrow().len(), 4);
        assert_relative_eq!(stepper.current_time(), 1.0);
        assert_eq!(clock.borrow().accepted, vec![0.25; 4]);
        assert!(stepper.is_globally_converged());
    }

    #[test]
    fn solving_past_the_end_time_takes_no_increment() {
        let journal = journal();
        let (mut stepper, clock) = stepper(Clock::new(&journal), 0.0, 1.0, 0.25);
        assert_eq!(stepper.solve().unwrap(), SolveStatus::Converged);

        assert_eq!(stepper.solve().unwrap(), SolveStatus::Converged);

        assert_eq!(journal.borrow().len(), 4);
        assert_eq!(clock.borrow().accepted, vec![0.25; 4]);
        assert_relative_eq!(stepper.current_time(), 1.0);
    }

    #[test]
    fn last_increment_is_clipped_to_end_time() {
        let journal = journal();
        let (mut stepper, clock) = stepper(Clock::new(&journal), 0.0, 1.0, 0.4);

        assert_eq!(stepper.number_of_time_steps(), 3);
        assert_eq!(stepper.solve().unwrap(), SolveStatus::Converged);

        let accepted = clock.borrow().accepted.clone();
        assert_eq!(accepted.len(), 3);
        assert_relative_eq!(accepted[2], 0.2, epsilon = 1e-12);
        assert_relative_eq!(stepper.current_time(), 1.0);
    }

    #[test]
    fn round_off_does_not_add_an_increment() {
        let journal = journal();
        let (stepper, _) = stepper(Clock::new(&journal), 0.0, 0.3, 0.1);
        assert_eq!(stepper.number_of_time_steps(), 3);
    }

    #[test]
    fn failed_increment_stops_the_stepper() {
        let journal = journal();
        let mut clock = Clock::new(&journal);
        clock.fail_on = Some(2);
        let (mut stepper, clock) = stepper(clock, 0.0, 1.0, 0.25);
        let log = handle(EventLog::default());
        stepper.add_observer(log.clone());

        assert_eq!(stepper.solve().unwrap(), SolveStatus::Failed);

        assert_eq!(stepper.number_of_iterations(), 2);
        assert_eq!(journal.borrow().len(), 2);
        assert_eq!(clock.borrow().accepted.len(), 1);
        assert_relative_eq!(stepper.current_time(), 0.25);
        assert!(!stepper.is_globally_converged());
        assert_eq!(log.borrow().events.last().map(String::as_str), Some("failed"));
    }

    #[test]
    fn reset_rewinds_time() {
        let journal = journal();
        let (mut stepper, _) = stepper(Clock::new(&journal), 2.0, 3.0, 0.5);
        stepper.solve().unwrap();
        assert_relative_eq!(stepper.current_time(), 3.0);

        stepper.reset();

        assert_relative_eq!(stepper.current_time(), 2.0);
        assert_eq!(stepper.number_of_iterations(), 0);
        assert_eq!(stepper.status(), SolveStatus::Unchecked);
    }

    #[test]
    fn registration_is_forwarded_to_the_inner_solver() {
        let journal = journal();
        let (stepper, _) = stepper(Clock::new(&journal), 0.0, 1.0, 0.5);

        let inner = stepper.solver().expect("inner solver set");
        assert!(inner.borrow().is_registration_complete());
        assert_eq!(inner.borrow().model_evaluators().len(), 1);
        assert_eq!(stepper.model_evaluator("clock").unwrap().borrow().name(), "clock");
    }

    #[test]
    fn missing_inner_solver_is_an_error() {
        let journal = journal();
        let mut stepper = TransientStepper::new();
        assert!(matches!(
            stepper.register_model_evaluator(handle(Clock::new(&journal))),
            Err(Error::MissingInnerSolver { .. })
        ));
        assert!(matches!(
            stepper.complete_registration(),
            Err(Error::MissingInnerSolver { .. })
        ));
    }

    #[test]
    fn too_many_time_steps_are_rejected() {
        let mut stepper = TransientStepper::new();
        let err = stepper
            .set_parameter_list(
                ParameterList::new()
                    .with("Time Step Size", 0.001)
                    .with("Maximum Number of Time Steps", 10),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { ref key, .. })
                if key == "Maximum Number of Time Steps"
        ));
    }

    #[test]
    fn non_positive_step_size_is_rejected() {
        let mut stepper = TransientStepper::new();
        let err = stepper
            .set_parameter_list(ParameterList::new().with("Time Step Size", 0.0))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { ref key, .. }) if key == "Time Step Size"
        ));
    }
}
