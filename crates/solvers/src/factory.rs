//! Building solver trees from configuration.
//!
//! A top-level configuration names its active solver sublist with
//! `"Solver Sublist Name"` and may name a status test sublist with
//! `"Status Test Sublist Name"`. Every other top-level entry is a sublist:
//!
//! ```json
//! {
//!   "Solver Sublist Name": "Outer",
//!   "Status Test Sublist Name": "Outer Tests",
//!   "Outer": {
//!     "Type": "Transient Stepper",
//!     "Internal Solver Sublist": "Coupling",
//!     "End Time": 10.0,
//!     "Time Step Size": 0.5
//!   },
//!   "Coupling": {
//!     "Type": "Block Gauss Seidel",
//!     "Status Test Sublist": "Coupling Tests"
//!   },
//!   "Outer Tests": { "Type": "Maximum Iterations", "Maximum Iterations": 100 },
//!   "Coupling Tests": { "Type": "Maximum Iterations", "Maximum Iterations": 20 }
//! }
//! ```
//!
//! Sublists refer to each other by top-level name, so a solver tree of any
//! depth is described by one flat configuration.


pub use status_tests::{StatusTestAbstractFactory, StatusTestFactory};

use std::{cell::RefCell, rc::Rc};

use braid_core::{ConfigError, Error, ParameterList, Solver, SolverHandle, Value};

use crate::{
    BlockGaussSeidel, BlockJacobi, TransientStepper,
    base::{STATUS_TEST_SUBLIST, TYPE},
    transient::{self, INTERNAL_SOLVER},
};

/// Top-level key naming the active solver sublist.
pub const SOLVER_SUBLIST_NAME: &str = "Solver Sublist Name";

/// Top-level key naming the status test sublist of the top solver.
pub const STATUS_TEST_SUBLIST_NAME: &str = "Status Test Sublist Name";

const GAUSS_SEIDEL: &str = "Block Gauss Seidel";
const JACOBI: &str = "Block Jacobi";

/// A user-supplied builder for solver types the built-ins lack.
pub trait SolverAbstractFactory {
    fn supports_type(&self, type_name: &str) -> bool;

    /// Builds the solver configured by the sublist `name` of `config`.
    ///
    /// `config` is the whole top-level configuration, so the built solver
    /// may refer to other sublists by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the sublist is not a valid configuration.
    fn build_solver(&self, config: &ParameterList, name: &str) -> Result<SolverHandle, Error>;
}

/// Builds solvers, recursively, from a top-level configuration.
///
/// The built-in types are `"Block Gauss Seidel"`, `"Block Jacobi"`, and
/// `"Transient Stepper"`. Other types are offered to the added factories in
/// the order they were added; the first one supporting the type builds it.
///
/// A built solver is configured but not registered: models and transfers
/// are registered by the caller, who then completes registration.
#[derive(Default)]
pub struct SolverFactory {
    extensions: Vec<Box<dyn SolverAbstractFactory>>,
    status_tests: StatusTestFactory,
}

impl SolverFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_factory(&mut self, factory: Box<dyn SolverAbstractFactory>) {
        self.extensions.push(factory);
    }

    /// Returns the factory used for status test sublists.
    pub fn status_test_factory_mut(&mut self) -> &mut StatusTestFactory {
        &mut self.status_tests
    }

    /// Returns true if `type_name` is one of the built-in solver types.
    #[must_use]
    pub fn supports_type(&self, type_name: &str) -> bool {
        [GAUSS_SEIDEL, JACOBI, transient::TYPE_NAME].contains(&type_name)
    }

    /// Builds the solver tree described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required key or referenced sublist is
    /// missing, a type is unsupported, internal solver references form a
    /// cycle, or a sublist is rejected by its solver.
    pub fn build_solver(&self, config: &ParameterList) -> Result<SolverHandle, Error> {
        let (name, _) = config.referenced_sublist(SOLVER_SUBLIST_NAME)?;
        let solver = self.build_sublist(config, SOLVER_SUBLIST_NAME, name, &mut Vec::new())?;

        if config.contains(STATUS_TEST_SUBLIST_NAME) {
            let (tests_name, tests) = config.referenced_sublist(STATUS_TEST_SUBLIST_NAME)?;
            let tests = self.status_tests.build_named(tests, tests_name)?;
            solver.borrow_mut().set_status_tests(tests);
        }

        tracing::debug!(sublist = name, solver = %solver.borrow().name(), "built solver");
        Ok(solver)
    }

    /// Builds the solver in the top-level sublist `name`, reached via `key`.
    ///
    /// `chain` holds the sublists currently being built, outermost first.
    fn build_sublist(
        &self,
        config: &ParameterList,
        key: &str,
        name: &str,
        chain: &mut Vec<String>,
    ) -> Result<SolverHandle, Error> {
        if chain.iter().any(|n| n == name) {
            return Err(ConfigError::CyclicSublist {
                key: key.to_owned(),
                name: name.to_owned(),
            }
            .into());
        }
        let sublist = top_level(config, key, name)?;
        let type_name = sublist.get_str(TYPE).map_err(|err| match err {
            ConfigError::MissingKey { .. } => ConfigError::MissingType {
                sublist: name.to_owned(),
            },
            other => other,
        })?;
        tracing::trace!(sublist = name, type_name, "building solver");

        let solver = match type_name {
            GAUSS_SEIDEL => configured(BlockGaussSeidel::default(), sublist)?,
            JACOBI => configured(BlockJacobi::default(), sublist)?,
            transient::TYPE_NAME => {
                let mut stepper = TransientStepper::new();
                stepper.set_parameter_list(sublist.clone())?;

                let inner_name = sublist.get_str(INTERNAL_SOLVER)?;
                chain.push(name.to_owned());
                let inner = self.build_sublist(config, INTERNAL_SOLVER, inner_name, chain);
                chain.pop();
                stepper.set_solver(inner?);

                handle(stepper)
            }
            other => {
                let Some(factory) = self.extensions.iter().find(|f| f.supports_type(other)) else {
                    return Err(ConfigError::UnsupportedSolverType {
                        type_name: other.to_owned(),
                    }
                    .into());
                };
                factory.build_solver(config, name)?
            }
        };

        if let Some(Value::String(tests_name)) = sublist.get(STATUS_TEST_SUBLIST) {
            if !tests_name.is_empty() {
                let list = top_level(config, STATUS_TEST_SUBLIST, tests_name)?;
                let tests = self.status_tests.build_named(list, tests_name)?;
                solver.borrow_mut().set_status_tests(tests);
            }
        }

        Ok(solver)
    }
}

fn top_level<'a>(
    config: &'a ParameterList,
    key: &str,
    name: &str,
) -> Result<&'a ParameterList, ConfigError> {
    match config.get(name) {
        Some(Value::List(list)) => Ok(list),
        _ => Err(ConfigError::MissingSublist {
            key: key.to_owned(),
            name: name.to_owned(),
        }),
    }
}

fn handle<S: Solver + 'static>(solver: S) -> SolverHandle {
    Rc::new(RefCell::new(solver))
}

fn configured<S: Solver + 'static>(
    mut solver: S,
    list: &ParameterList,
) -> Result<SolverHandle, Error> {
    solver.set_parameter_list(list.clone())?;
    Ok(handle(solver))
}

/// Checks the shape of a top-level configuration.
///
/// Every top-level entry must be a sublist, `"Solver Sublist Name"`, or
/// `"Status Test Sublist Name"`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTopLevelEntry`] for the first entry that is
/// none of these.
pub fn validate_parameter_list(config: &ParameterList) -> Result<(), ConfigError> {
    for (key, value) in config {
        let reserved = key == SOLVER_SUBLIST_NAME || key == STATUS_TEST_SUBLIST_NAME;
        if !reserved && !matches!(value, Value::List(_)) {
            return Err(ConfigError::InvalidTopLevelEntry { key: key.clone() });
        }
    }
    Ok(())
}
