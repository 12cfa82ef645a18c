use std::{cell::RefCell, rc::Rc};

use crate::Error;

/// A shared handle to a registered model evaluator.
pub type ModelHandle = Rc<RefCell<dyn ModelEvaluator>>;

/// An opaque physics code driven by a coupling solver.
///
/// A model exposes named parameters (inputs) and responses (outputs), each
/// addressed by a stable index that is its position in
/// [`parameter_names`](ModelEvaluator::parameter_names) or
/// [`response_names`](ModelEvaluator::response_names). Name lookups are
/// provided in terms of those lists; implementors with faster lookups may
/// override them, but must keep the name/index mapping bijective.
///
/// The transient hooks ([`is_transient`](ModelEvaluator::is_transient),
/// [`set_next_time_step_size`](ModelEvaluator::set_next_time_step_size),
/// [`accept_time_step`](ModelEvaluator::accept_time_step)) are only used by a
/// transient stepper and default to a steady-state model.
pub trait ModelEvaluator {
    /// Returns the model's name, unique within a solver.
    fn name(&self) -> &str;

    /// Runs the model with its current parameters.
    ///
    /// Returns `Ok(false)` when the model's own solve did not converge. That
    /// is a normal outcome; coupling solvers turn it into a failed step.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot run at all.
    fn solve(&mut self) -> Result<bool, Error>;

    /// Returns true if the model's last solve converged.
    fn is_locally_converged(&self) -> bool;

    /// Returns true if the model considers the coupled problem converged.
    fn is_globally_converged(&self) -> bool {
        true
    }

    /// Returns the parameter names in index order.
    fn parameter_names(&self) -> &[String] {
        &[]
    }

    fn number_of_parameters(&self) -> usize {
        self.parameter_names().len()
    }

    /// Returns the name of the parameter at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    fn parameter_name(&self, index: usize) -> Result<&str, Error> {
        let names = self.parameter_names();
        names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::ParameterIndex {
                model: self.name().to_owned(),
                index,
                len: names.len(),
            })
    }

    /// Returns the index of the parameter called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has no such parameter.
    fn parameter_index(&self, name: &str) -> Result<usize, Error> {
        self.parameter_names()
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::UnknownParameter {
                model: self.name().to_owned(),
                name: name.to_owned(),
            })
    }

    fn supports_parameter(&self, name: &str) -> bool {
        self.parameter_names().iter().any(|n| n == name)
    }

    /// Sets the parameter at `index`.
    ///
    /// The default implementation rejects every index.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or the parameter cannot be
    /// set.
    fn set_parameter(&mut self, index: usize, values: &[f64]) -> Result<(), Error> {
        let _ = values;
        let name = self.parameter_name(index)?.to_owned();
        Err(Error::ReadOnlyParameter {
            model: self.name().to_owned(),
            name,
        })
    }

    /// Returns the response names in index order.
    fn response_names(&self) -> &[String];

    fn number_of_responses(&self) -> usize {
        self.response_names().len()
    }

    /// Returns the name of the response at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    fn response_name(&self, index: usize) -> Result<&str, Error> {
        let names = self.response_names();
        names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::ResponseIndex {
                model: self.name().to_owned(),
                index,
                len: names.len(),
            })
    }

    /// Returns the index of the response called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has no such response.
    fn response_index(&self, name: &str) -> Result<usize, Error> {
        self.response_names()
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::UnknownResponse {
                model: self.name().to_owned(),
                name: name.to_owned(),
            })
    }

    fn supports_response(&self, name: &str) -> bool {
        self.response_names().iter().any(|n| n == name)
    }

    /// Returns a copy of the response values at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    fn response(&self, index: usize) -> Result<Vec<f64>, Error>;

    /// Returns true if the model integrates in time.
    fn is_transient(&self) -> bool {
        false
    }

    /// Sets the size of the time step the next solve should take.
    fn set_next_time_step_size(&mut self, dt: f64) {
        let _ = dt;
    }

    /// Commits the last solved time step.
    fn accept_time_step(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scale {
        names: Vec<String>,
        factor: f64,
        x: f64,
        y: f64,
    }

    impl Scale {
        fn new(factor: f64) -> Self {
            Self {
                names: vec!["x".into()],
                factor,
                x: 0.0,
                y: 0.0,
            }
        }
    }

    impl ModelEvaluator for Scale {
        fn name(&self) -> &str {
            "scale"
        }

        fn solve(&mut self) -> Result<bool, Error> {
            self.y = self.factor * self.x;
            Ok(true)
        }

        fn is_locally_converged(&self) -> bool {
            true
        }

        fn parameter_names(&self) -> &[String] {
            &self.names
        }

        fn set_parameter(&mut self, index: usize, values: &[f64]) -> Result<(), Error> {
            self.parameter_name(index)?;
            self.x = values[0];
            Ok(())
        }

        fn response_names(&self) -> &[String] {
            std::slice::from_ref(&self.names[0])
        }

        fn response(&self, index: usize) -> Result<Vec<f64>, Error> {
            self.response_name(index)?;
            Ok(vec![self.y])
        }
    }

    #[test]
    fn provided_lookups_follow_name_lists() {
        let model = Scale::new(2.0);

        assert_eq!(model.number_of_parameters(), 1);
        assert_eq!(model.parameter_index("x").unwrap(), 0);
        assert_eq!(model.parameter_name(0).unwrap(), "x");
        assert!(model.supports_parameter("x"));
        assert!(!model.supports_parameter("y"));
        assert!(matches!(
            model.parameter_index("y"),
            Err(Error::UnknownParameter { .. })
        ));
        assert!(matches!(
            model.response_name(3),
            Err(Error::ResponseIndex { index: 3, len: 1, .. })
        ));
    }

    #[test]
    fn set_and_solve() {
        let mut model = Scale::new(3.0);
        model.set_parameter(0, &[2.0]).unwrap();
        assert!(model.solve().unwrap());
        assert_eq!(model.response(0).unwrap(), vec![6.0]);
    }

    #[test]
    fn steady_state_defaults() {
        let mut model = Scale::new(1.0);
        assert!(!model.is_transient());
        assert!(model.is_globally_converged());
        model.set_next_time_step_size(0.1);
        model.accept_time_step();
    }
}
