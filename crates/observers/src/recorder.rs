use braid_core::{SolveStatus, Solver, SolverObserver};

use crate::Event;

/// The solver state at one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub event: Event,
    pub solver: String,
    pub iteration: usize,
    pub status: SolveStatus,
}

/// An observer that records every notification it receives.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use braid_core::Solver;
/// use braid_observers::RecordingObserver;
/// use braid_solvers::BlockJacobi;
///
/// let recorder = Rc::new(RefCell::new(RecordingObserver::new()));
/// let mut solver = BlockJacobi::default();
/// solver.add_observer(recorder.clone());
/// assert!(recorder.borrow().records().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    records: Vec<Record>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the recorded events in order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.records.iter().map(|r| r.event).collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn record(&mut self, event: Event, solver: &dyn Solver) {
        self.records.push(Record {
            event,
            solver: solver.name().to_owned(),
            iteration: solver.number_of_iterations(),
            status: solver.status(),
        });
    }
}

impl SolverObserver for RecordingObserver {
    fn observe_begin_solve(&mut self, solver: &dyn Solver) {
        self.record(Event::BeginSolve, solver);
    }

    fn observe_end_solve(&mut self, solver: &dyn Solver) {
        self.record(Event::EndSolve, solver);
    }

    fn observe_begin_step(&mut self, solver: &dyn Solver) {
        self.record(Event::BeginStep, solver);
    }

    fn observe_end_step(&mut self, solver: &dyn Solver) {
        self.record(Event::EndStep, solver);
    }

    fn observe_converged_solve(&mut self, solver: &dyn Solver) {
        self.record(Event::ConvergedSolve, solver);
    }

    fn observe_failed_solve(&mut self, solver: &dyn Solver) {
        self.record(Event::FailedSolve, solver);
    }
}
