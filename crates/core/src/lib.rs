//! Core contracts for the Braid coupling-solver engine.
//!
//! This crate defines the abstractions that coupling solvers, status tests,
//! observers, and black-box physics codes share:
//!
//! - [`ModelEvaluator`]: an opaque model with named parameters and responses
//! - [`DataTransfer`]: moves response values of one model into another
//! - [`StatusTest`]: a composable convergence predicate over solver state
//! - [`SolverObserver`]: a lifecycle listener notified at solve/step boundaries
//! - [`Solver`]: the step/solve state machine that sequences all of the above
//! - [`ParameterList`]: the hierarchical configuration consumed by factories
//!
//! Collaborators are shared through single-threaded handles
//! ([`ModelHandle`], [`TransferHandle`], [`ObserverHandle`], [`SolverHandle`])
//! because a data transfer and its solver both refer to the same models.
//!
//! Usage and configuration problems are reported as [`Error`]. Convergence
//! outcomes are never errors: they are reported as a [`SolveStatus`].

mod config;
mod error;
mod model;
mod observer;
mod solver;
mod status;
mod transfer;

pub use config::{ConfigError, ParameterList, Value};
pub use error::{EntityKind, Error};
pub use model::{ModelEvaluator, ModelHandle};
pub use observer::{ObserverHandle, SolverObserver};
pub use solver::{Solver, SolverHandle};
pub use status::SolveStatus;
pub use status_test::StatusTest;
pub use transfer::{DataTransfer, TransferHandle};
