use braid_core::{Error, ModelHandle, TransferHandle};

use crate::base::StepOutcome;

use super::CouplingStrategy;

/// Simultaneous block coupling.
///
/// Every model is solved from the inputs of the previous exchange, and data
/// is exchanged only once all of them have solved. The result does not
/// depend on registration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jacobi;

impl CouplingStrategy for Jacobi {
    fn type_name(&self) -> &'static str {
        "Block Jacobi"
    }

    fn step(
        &mut self,
        models: &[ModelHandle],
        transfers: &[TransferHandle],
    ) -> Result<StepOutcome, Error> {
        let mut failed = Vec::new();
        for model in models {
            if !model.borrow_mut().solve()? {
                failed.push(model.borrow().name().to_owned());
            }
        }

        if !failed.is_empty() {
            tracing::debug!(models = ?failed, "model solves failed, skipping exchange");
            return Ok(StepOutcome::Failed);
        }

        for transfer in transfers {
            transfer.borrow_mut().do_transfer()?;
        }
        Ok(StepOutcome::Continue)
    }
}
