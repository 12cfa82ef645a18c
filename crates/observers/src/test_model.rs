use braid_core::{Error, ModelEvaluator};

/// A model that counts its solves.
#[derive(Debug, Default)]
pub(crate) struct Counter {
    names: Vec<String>,
    solves: usize,
}

impl ModelEvaluator for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn solve(&mut self) -> Result<bool, Error> {
        self.solves += 1;
        Ok(true)
    }

    fn is_locally_converged(&self) -> bool {
        self.solves > 0
    }

    fn response_names(&self) -> &[String] {
        &self.names
    }

    fn response(&self, index: usize) -> Result<Vec<f64>, Error> {
        self.response_name(index)?;
        Ok(Vec::new())
    }
}
