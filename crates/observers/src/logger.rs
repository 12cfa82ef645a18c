use braid_core::{Solver, SolverObserver};
use tracing::Level;

use crate::Event;

const TARGET: &str = "braid::observer";

/// An observer that logs every notification as a `tracing` event.
///
/// Events carry the solver name, iteration count, and status as fields and
/// are emitted on the `braid::observer` target at the configured level.
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    level: Level,
}

impl TracingObserver {
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    fn emit(&self, event: Event, solver: &dyn Solver) {
        // The level of a `tracing` event must be a constant.
        macro_rules! emit_at {
            ($level:expr) => {
                tracing::event!(
                    target: TARGET,
                    $level,
                    solver = solver.name(),
                    iteration = solver.number_of_iterations(),
                    status = %solver.status(),
                    "{event}"
                )
            };
        }

        if self.level == Level::ERROR {
            emit_at!(Level::ERROR);
        } else if self.level == Level::WARN {
            emit_at!(Level::WARN);
        } else if self.level == Level::INFO {
            emit_at!(Level::INFO);
        } else if self.level == Level::DEBUG {
            emit_at!(Level::DEBUG);
        } else {
            emit_at!(Level::TRACE);
        }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl SolverObserver for TracingObserver {
    fn observe_begin_solve(&mut self, solver: &dyn Solver) {
        self.emit(Event::BeginSolve, solver);
    }

    fn observe_end_solve(&mut self, solver: &dyn Solver) {
        self.emit(Event::EndSolve, solver);
    }

    fn observe_begin_step(&mut self, solver: &dyn Solver) {
        self.emit(Event::BeginStep, solver);
    }

    fn observe_end_step(&mut self, solver: &dyn Solver) {
        self.emit(Event::EndStep, solver);
    }

    fn observe_converged_solve(&mut self, solver: &dyn Solver) {
        self.emit(Event::ConvergedSolve, solver);
    }

    fn observe_failed_solve(&mut self, solver: &dyn Solver) {
        self.emit(Event::FailedSolve, solver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{cell::RefCell, rc::Rc};

    use braid_core::SolveStatus;
    use braid_solvers::{BlockJacobi, status_tests::MaxIterations};

    use crate::test_model::Counter;

    #[test]
    fn defaults_to_info() {
        assert_eq!(TracingObserver::default().level(), Level::INFO);
        assert_eq!(TracingObserver::new(Level::TRACE).level(), Level::TRACE);
    }

    #[test]
    fn observes_a_solve_at_every_level() {
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            let mut solver = BlockJacobi::default();
            solver
                .register_model_evaluator(Rc::new(RefCell::new(Counter::default())))
                .unwrap();
            solver.add_observer(Rc::new(RefCell::new(TracingObserver::new(level))));
            solver.set_status_tests(Box::new(MaxIterations::new(2)));
            solver.complete_registration().unwrap();

            assert_eq!(solver.solve().unwrap(), SolveStatus::Failed);
        }
    }
}
