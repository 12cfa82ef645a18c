//! A scripted model for exercising solver control flow.

use braid_core::{Error, ModelEvaluator};

/// What happens when a [`MockModel`] reaches its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The solve that reaches the trigger fails.
    LocalFailure,
    /// The model reports global convergence from the trigger on.
    GlobalConvergence,
}

/// A model whose behavior is keyed to how many times it has been solved.
///
/// Its single response, `"<name>.count"`, is the number of solves so far,
/// frozen once it reaches the freeze count.
#[derive(Debug, Clone)]
pub struct MockModel {
    name: String,
    trigger: Trigger,
    at: usize,
    freeze_at: usize,
    solves: usize,
    converged: bool,
    responses: Vec<String>,
}

impl MockModel {
    pub fn new(name: impl Into<String>, trigger: Trigger, at: usize, freeze_at: usize) -> Self {
        let name = name.into();
        let responses = vec![format!("{name}.count")];
        Self {
            name,
            trigger,
            at,
            freeze_at,
            solves: 0,
            converged: false,
            responses,
        }
    }

    #[must_use]
    pub fn solves(&self) -> usize {
        self.solves
    }
}

impl ModelEvaluator for MockModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self) -> Result<bool, Error> {
        self.solves += 1;
        self.converged = !(self.trigger == Trigger::LocalFailure && self.solves == self.at);
        Ok(self.converged)
    }

    fn is_locally_converged(&self) -> bool {
        self.converged
    }

    fn is_globally_converged(&self) -> bool {
        self.trigger == Trigger::GlobalConvergence && self.solves >= self.at
    }

    fn response_names(&self) -> &[String] {
        &self.responses
    }

    #[allow(clippy::cast_precision_loss)]
    fn response(&self, index: usize) -> Result<Vec<f64>, Error> {
        self.response_name(index)?;
        Ok(vec![self.solves.min(self.freeze_at) as f64])
    }
}
