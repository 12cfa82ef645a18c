use std::{cell::RefCell, rc::Rc};

use crate::Solver;

/// A shared handle to a registered observer.
pub type ObserverHandle = Rc<RefCell<dyn SolverObserver>>;

/// Receives lifecycle notifications from a solver.
///
/// Observers are notified synchronously, in the order they were added. Every
/// callback has a no-op default so implementors only override what they need.
/// An observer must not call back into the solver that notifies it.
pub trait SolverObserver {
    fn observe_begin_solve(&mut self, solver: &dyn Solver) {
        let _ = solver;
    }

    fn observe_end_solve(&mut self, solver: &dyn Solver) {
        let _ = solver;
    }

    fn observe_begin_step(&mut self, solver: &dyn Solver) {
        let _ = solver;
    }

    fn observe_end_step(&mut self, solver: &dyn Solver) {
        let _ = solver;
    }

    /// Called after `observe_end_solve` when the solve converged.
    fn observe_converged_solve(&mut self, solver: &dyn Solver) {
        let _ = solver;
    }

    /// Called after `observe_end_solve` when the solve failed.
    fn observe_failed_solve(&mut self, solver: &dyn Solver) {
        let _ = solver;
    }
}

/// A no-op observer.
impl SolverObserver for () {}
