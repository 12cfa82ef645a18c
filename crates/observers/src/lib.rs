//! Reusable observers for Braid solvers.
//!
//! Every observer here implements [`SolverObserver`] and works with any
//! [`Solver`]:
//!
//! - [`RecordingObserver`] keeps a [`Record`] of every notification, for
//!   tests and post-solve inspection.
//! - [`TracingObserver`] logs every notification through `tracing`.
//!
//! [`SolverObserver`]: braid_core::SolverObserver
//! [`Solver`]: braid_core::Solver

mod event;
mod logger;
mod recorder;

pub use event::Event;
pub use logger::TracingObserver;
pub use recorder::{Record, RecordingObserver};

#[cfg(test)]
mod test_model;
