use std::{cell::RefCell, rc::Rc};

use crate::Error;

/// A shared handle to a registered data transfer.
pub type TransferHandle = Rc<RefCell<dyn DataTransfer>>;

/// Moves response values of one or more models into parameters of others.
///
/// A transfer refers to its models by name so that a coupling solver can
/// schedule it relative to the models it feeds. How values are interpolated
/// or projected is entirely up to the implementation.
pub trait DataTransfer {
    /// Returns the transfer's name, unique within a solver.
    fn name(&self) -> &str;

    /// Performs the transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer cannot be performed.
    fn do_transfer(&mut self) -> Result<(), Error>;

    /// Names of the models whose responses are read.
    fn source_model_names(&self) -> &[String];

    /// Names of the models whose parameters are written.
    fn target_model_names(&self) -> &[String];

    /// Returns true if this transfer writes into the model called `name`.
    fn targets(&self, name: &str) -> bool {
        self.target_model_names().iter().any(|n| n == name)
    }
}
