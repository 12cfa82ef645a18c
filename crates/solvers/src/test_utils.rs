//! Fixtures shared by the unit tests in this crate.

use std::{cell::RefCell, fmt, rc::Rc};

use braid_core::{
    DataTransfer, Error, ModelEvaluator, ModelHandle, SolveStatus, Solver, SolverObserver,
    StatusTest,
};

/// A shared record of model solves and transfers, in call order.
pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn handle<T>(value: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(value))
}

/// A model with one parameter `in` and one response `out = in + 1`.
pub(crate) struct Probe {
    name: String,
    journal: Journal,
    parameters: Vec<String>,
    responses: Vec<String>,
    fail_on: Option<usize>,
    solves: usize,
    input: f64,
    output: f64,
    converged: bool,
    global: bool,
}

impl Probe {
    pub(crate) fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_owned(),
            journal: Rc::clone(journal),
            parameters: vec!["in".to_owned()],
            responses: vec!["out".to_owned()],
            fail_on: None,
            solves: 0,
            input: 0.0,
            output: 0.0,
            converged: false,
            global: true,
        }
    }

    /// Makes the `n`-th solve (1-based) report failure.
    pub(crate) fn failing_on(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    /// Renames the parameter and response.
    pub(crate) fn with_names(mut self, parameter: &str, response: &str) -> Self {
        self.parameters = vec![parameter.to_owned()];
        self.responses = vec![response.to_owned()];
        self
    }

    /// Makes the model report that the coupled problem is not converged.
    pub(crate) fn globally_unconverged(mut self) -> Self {
        self.global = false;
        self
    }

    pub(crate) fn input(&self) -> f64 {
        self.input
    }
}

impl ModelEvaluator for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self) -> Result<bool, Error> {
        self.solves += 1;
        self.journal.borrow_mut().push(format!("solve {}", self.name));
        self.converged = self.fail_on != Some(self.solves);
        if self.converged {
            self.output = self.input + 1.0;
        }
        Ok(self.converged)
    }

    fn is_locally_converged(&self) -> bool {
        self.converged
    }

    fn is_globally_converged(&self) -> bool {
        self.global
    }

    fn parameter_names(&self) -> &[String] {
        &self.parameters
    }

    fn set_parameter(&mut self, index: usize, values: &[f64]) -> Result<(), Error> {
        self.parameter_name(index)?;
        self.input = values[0];
        Ok(())
    }

    fn response_names(&self) -> &[String] {
        &self.responses
    }

    fn response(&self, index: usize) -> Result<Vec<f64>, Error> {
        self.response_name(index)?;
        Ok(vec![self.output])
    }
}

/// Copies response 0 of one model into parameter 0 of another.
pub(crate) struct Link {
    name: String,
    journal: Journal,
    from: ModelHandle,
    to: ModelHandle,
    sources: Vec<String>,
    targets: Vec<String>,
}

impl Link {
    pub(crate) fn new(from: &ModelHandle, to: &ModelHandle, journal: &Journal) -> Self {
        let source = from.borrow().name().to_owned();
        let target = to.borrow().name().to_owned();
        Self {
            name: format!("{source}->{target}"),
            journal: Rc::clone(journal),
            from: Rc::clone(from),
            to: Rc::clone(to),
            sources: vec![source],
            targets: vec![target],
        }
    }

    /// Declares `name` as a further target without writing to it.
    pub(crate) fn also_targeting(mut self, name: &str) -> Self {
        self.targets.push(name.to_owned());
        self
    }
}

impl DataTransfer for Link {
    fn name(&self) -> &str {
        &self.name
    }

    fn do_transfer(&mut self) -> Result<(), Error> {
        self.journal
            .borrow_mut()
            .push(format!("transfer {}", self.name));
        let values = self.from.borrow().response(0)?;
        self.to.borrow_mut().set_parameter(0, &values)
    }

    fn source_model_names(&self) -> &[String] {
        &self.sources
    }

    fn target_model_names(&self) -> &[String] {
        &self.targets
    }
}

/// Converges once the solver has taken `iterations` steps.
pub(crate) struct ConvergeAfter {
    iterations: usize,
    status: SolveStatus,
}

impl ConvergeAfter {
    pub(crate) fn new(iterations: usize) -> Self {
        Self {
            iterations,
            status: SolveStatus::Unchecked,
        }
    }
}

impl StatusTest for ConvergeAfter {
    fn check_status(&mut self, solver: &dyn Solver) -> Result<SolveStatus, Error> {
        self.status = if solver.number_of_iterations() >= self.iterations {
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
        writeln!(f, "{:indent$}{} after {}", "", self.status, self.iterations)
    }
}

/// Records every observer callback as a short string.
#[derive(Default)]
pub(crate) struct EventLog {
    pub(crate) events: Vec<String>,
}

impl SolverObserver for EventLog {
    fn observe_begin_solve(&mut self, _solver: &dyn Solver) {
        self.events.push("begin solve".into());
    }

    fn observe_end_solve(&mut self, _solver: &dyn Solver) {
        self.events.push("end solve".into());
    }

    fn observe_begin_step(&mut self, solver: &dyn Solver) {
        self.events
            .push(format!("begin step {}", solver.number_of_iterations()));
    }

    fn observe_end_step(&mut self, solver: &dyn Solver) {
        self.events
            .push(format!("end step {}", solver.number_of_iterations()));
    }

    fn observe_converged_solve(&mut self, _solver: &dyn Solver) {
        self.events.push("converged".into());
    }

    fn observe_failed_solve(&mut self, _solver: &dyn Solver) {
        self.events.push("failed".into());
    }
}
