//! A data transfer that copies a response into a parameter.

use std::rc::Rc;

use braid_core::{DataTransfer, Error, ModelHandle};

/// Copies one named response of a source model into one named parameter of
/// a target model, unchanged.
///
/// Names are resolved to indices when the transfer is created.
pub struct CopyResponse {
    name: String,
    source: ModelHandle,
    response: usize,
    target: ModelHandle,
    parameter: usize,
    sources: Vec<String>,
    targets: Vec<String>,
}

impl CopyResponse {
    /// Creates a transfer of `source.response` into `target.parameter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownResponse`] or [`Error::UnknownParameter`] if
    /// either model lacks the named entry.
    pub fn new(
        name: impl Into<String>,
        source: &ModelHandle,
        response: &str,
        target: &ModelHandle,
        parameter: &str,
    ) -> Result<Self, Error> {
        let (source_name, response) = {
            let source = source.borrow();
            (source.name().to_owned(), source.response_index(response)?)
        };
        let (target_name, parameter) = {
            let target = target.borrow();
            (target.name().to_owned(), target.parameter_index(parameter)?)
        };

        Ok(Self {
            name: name.into(),
            source: Rc::clone(source),
            response,
            target: Rc::clone(target),
            parameter,
            sources: vec![source_name],
            targets: vec![target_name],
        })
    }
}

impl DataTransfer for CopyResponse {
    fn name(&self) -> &str {
        &self.name
    }

    fn do_transfer(&mut self) -> Result<(), Error> {
        let values = self.source.borrow().response(self.response)?;
        tracing::trace!(transfer = %self.name, ?values, "copying response");
        self.target
            .borrow_mut()
            .set_parameter(self.parameter, &values)
    }

    fn source_model_names(&self) -> &[String] {
        &self.sources
    }

    fn target_model_names(&self) -> &[String] {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use braid_core::ModelEvaluator;

    use crate::test_utils::{Probe, handle, journal};

    #[test]
    fn copies_the_named_response() {
        let journal = journal();
        let a = handle(Probe::new("a", &journal).with_names("x", "y"));
        let b = handle(Probe::new("b", &journal).with_names("u", "v"));
        let (source, target): (ModelHandle, ModelHandle) = (a.clone(), b.clone());

        let mut transfer = CopyResponse::new("a to b", &source, "y", &target, "u").unwrap();
        assert_eq!(transfer.source_model_names(), ["a"]);
        assert!(transfer.targets("b"));

        a.borrow_mut().set_parameter(0, &[2.0]).unwrap();
        a.borrow_mut().solve().unwrap();
        transfer.do_transfer().unwrap();

        assert_eq!(b.borrow().input(), 3.0);
    }

    #[test]
    fn unknown_names_are_rejected_up_front() {
        let journal = journal();
        let a: ModelHandle = handle(Probe::new("a", &journal));
        let b: ModelHandle = handle(Probe::new("b", &journal));

        assert!(matches!(
            CopyResponse::new("t", &a, "missing", &b, "in"),
            Err(Error::UnknownResponse { ref name, .. }) if name == "missing"
        ));
        assert!(matches!(
            CopyResponse::new("t", &a, "out", &b, "missing"),
            Err(Error::UnknownParameter { ref model, .. }) if model == "b"
        ));
    }
}
