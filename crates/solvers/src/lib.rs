//! Coupling solvers for the Braid framework.
//!
//! Every solver here implements [`braid_core::Solver`] on top of one shared
//! step/solve driver; the solvers differ only in their per-step update.
//!
//! # Solvers
//!
//! - [`BlockGaussSeidel`]: solves models one after another, feeding each
//!   fresh results from the models before it
//! - [`BlockJacobi`]: solves every model from the same snapshot, then
//!   exchanges all data at once
//! - [`TransientStepper`]: runs a full inner solve once per time step
//!
//! New fixed-point schemes only need a [`CouplingStrategy`].
//!
//! # Composition
//!
//! [`adapter`] presents a solver as a [`ModelEvaluator`] so a solved
//! sub-problem can be nested inside another coupling scheme, and [`factory`]
//! builds solver trees from a [`ParameterList`].
//!
//! [`ModelEvaluator`]: braid_core::ModelEvaluator
//! [`ParameterList`]: braid_core::ParameterList

mod base;
mod coupling;
mod transient;

#[cfg(test)]
mod test_utils;

pub mod adapter;
pub mod factory;
pub mod transfer;

pub use base::StepOutcome;
pub use coupling::{
    BlockGaussSeidel, BlockJacobi, CouplingSolver, CouplingStrategy, GaussSeidel, Jacobi,
};
pub use transient::TransientStepper;
