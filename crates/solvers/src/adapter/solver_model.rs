use braid_core::{Error, ModelEvaluator, SolverHandle};

use super::{NamePolicy, Namespace, SolverAdapterModelEvaluator};

/// A solver presented as a model that also reports the solver's global
/// convergence.
///
/// Use this variant when the wrapped solver takes part in a hierarchical
/// convergence check; otherwise [`SolverAdapterModelEvaluator`] is enough.
pub struct SolverModelEvaluator {
    adapter: SolverAdapterModelEvaluator,
}

impl SolverModelEvaluator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            adapter: SolverAdapterModelEvaluator::new(name),
        }
    }

    #[must_use]
    pub fn with_policy(self, policy: NamePolicy) -> Self {
        Self {
            adapter: self.adapter.with_policy(policy),
        }
    }

    /// Wraps `solver` and rebuilds the namespace from its models.
    ///
    /// # Errors
    ///
    /// See [`SolverAdapterModelEvaluator::set_solver`].
    pub fn set_solver(&mut self, solver: SolverHandle) -> Result<(), Error> {
        self.adapter.set_solver(solver)
    }

    #[must_use]
    pub fn solver(&self) -> Option<SolverHandle> {
        self.adapter.solver()
    }

    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        self.adapter.namespace()
    }
}

impl ModelEvaluator for SolverModelEvaluator {
    fn name(&self) -> &str {
        self.adapter.name()
    }

    fn solve(&mut self) -> Result<bool, Error> {
        self.adapter.solve()
    }

    fn is_locally_converged(&self) -> bool {
        self.adapter.is_locally_converged()
    }

    fn is_globally_converged(&self) -> bool {
        self.adapter
            .solver()
            .is_some_and(|s| s.borrow().is_globally_converged())
    }

    fn parameter_names(&self) -> &[String] {
        self.adapter.parameter_names()
    }

    fn parameter_index(&self, name: &str) -> Result<usize, Error> {
        self.adapter.parameter_index(name)
    }

    fn supports_parameter(&self, name: &str) -> bool {
        self.adapter.supports_parameter(name)
    }

    fn set_parameter(&mut self, index: usize, values: &[f64]) -> Result<(), Error> {
        self.adapter.set_parameter(index, values)
    }

    fn response_names(&self) -> &[String] {
        self.adapter.response_names()
    }

    fn response_index(&self, name: &str) -> Result<usize, Error> {
        self.adapter.response_index(name)
    }

    fn supports_response(&self, name: &str) -> bool {
        self.adapter.supports_response(name)
    }

    fn response(&self, index: usize) -> Result<Vec<f64>, Error> {
        self.adapter.response(index)
    }
}
