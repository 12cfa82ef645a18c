//! Solvers presented as model evaluators.
//!
//! Wrapping a solver in a [`SolverAdapterModelEvaluator`] lets a solved
//! sub-problem take part in another coupling scheme as a single model. The
//! adapter's parameters and responses are the union of those of the wrapped
//! solver's models (see [`Namespace`]), and solving the adapter runs a full
//! `reset()` + `solve()` of the wrapped solver.
//!
//! [`SolverModelEvaluator`] is the same adapter, except that it reports the
//! wrapped solver's own global convergence instead of always `true`.

mod namespace;
mod solver_model;

pub use namespace::{Location, NamePolicy, Namespace};
pub use solver_model::SolverModelEvaluator;

use braid_core::{Error, ModelEvaluator, ModelHandle, SolveStatus, SolverHandle};

/// A solver presented as a single model evaluator.
///
/// The namespace is built from the solver's registered models when the solver
/// is set, so set it after the solver's registration is complete.
pub struct SolverAdapterModelEvaluator {
    name: String,
    policy: NamePolicy,
    solver: Option<SolverHandle>,
    models: Vec<ModelHandle>,
    namespace: Namespace,
}

impl SolverAdapterModelEvaluator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy: NamePolicy::default(),
            solver: None,
            models: Vec::new(),
            namespace: Namespace::default(),
        }
    }

    /// Sets how names shared by several models are handled.
    #[must_use]
    pub fn with_policy(mut self, policy: NamePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Wraps `solver` and rebuilds the namespace from its models.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameCollision`] if the policy is
    /// [`NamePolicy::Reject`] and two models share a name. The previous
    /// solver, if any, is kept in that case.
    pub fn set_solver(&mut self, solver: SolverHandle) -> Result<(), Error> {
        let models = solver.borrow().model_evaluators();
        self.namespace = Namespace::build(&models, self.policy)?;
        self.models = models;
        self.solver = Some(solver);
        tracing::debug!(
            adapter = %self.name,
            parameters = self.namespace.parameter_names().len(),
            responses = self.namespace.response_names().len(),
            "namespace rebuilt"
        );
        Ok(())
    }

    #[must_use]
    pub fn solver(&self) -> Option<SolverHandle> {
        self.solver.clone()
    }

    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn wrapped(&self) -> Result<&SolverHandle, Error> {
        self.solver.as_ref().ok_or_else(|| Error::MissingInnerSolver {
            solver: self.name.clone(),
        })
    }

    fn parameter_location(&self, index: usize) -> Result<Location, Error> {
        self.namespace
            .parameter(index)
            .ok_or_else(|| Error::ParameterIndex {
                model: self.name.clone(),
                index,
                len: self.namespace.parameter_names().len(),
            })
    }

    fn response_location(&self, index: usize) -> Result<Location, Error> {
        self.namespace
            .response(index)
            .ok_or_else(|| Error::ResponseIndex {
                model: self.name.clone(),
                index,
                len: self.namespace.response_names().len(),
            })
    }
}

impl ModelEvaluator for SolverAdapterModelEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    /// Resets and solves the wrapped solver; true if it converged.
    fn solve(&mut self) -> Result<bool, Error> {
        let mut solver = self.wrapped()?.borrow_mut();
        solver.reset();
        Ok(solver.solve()? == SolveStatus::Converged)
    }

    fn is_locally_converged(&self) -> bool {
        self.solver
            .as_ref()
            .is_some_and(|s| s.borrow().status() == SolveStatus::Converged)
    }

    /// Always true: global convergence is left to the enclosing scheme.
    fn is_globally_converged(&self) -> bool {
        true
    }

    fn parameter_names(&self) -> &[String] {
        self.namespace.parameter_names()
    }

    fn parameter_index(&self, name: &str) -> Result<usize, Error> {
        self.namespace
            .parameter_index(name)
            .ok_or_else(|| Error::UnknownParameter {
                model: self.name.clone(),
                name: name.to_owned(),
            })
    }

    fn supports_parameter(&self, name: &str) -> bool {
        self.namespace.parameter_index(name).is_some()
    }

    fn set_parameter(&mut self, index: usize, values: &[f64]) -> Result<(), Error> {
        let location = self.parameter_location(index)?;
        self.models[location.model]
            .borrow_mut()
            .set_parameter(location.local, values)
    }

    fn response_names(&self) -> &[String] {
        self.namespace.response_names()
    }

    fn response_index(&self, name: &str) -> Result<usize, Error> {
        self.namespace
            .response_index(name)
            .ok_or_else(|| Error::UnknownResponse {
                model: self.name.clone(),
                name: name.to_owned(),
            })
    }

    fn supports_response(&self, name: &str) -> bool {
        self.namespace.response_index(name).is_some()
    }

    fn response(&self, index: usize) -> Result<Vec<f64>, Error> {
        let location = self.response_location(index)?;
        self.models[location.model].borrow().response(location.local)
    }
}
