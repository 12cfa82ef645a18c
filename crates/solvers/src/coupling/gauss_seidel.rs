use braid_core::{Error, ModelHandle, TransferHandle};

use crate::base::StepOutcome;

use super::CouplingStrategy;

/// Sequential block coupling.
///
/// Within a pass each model is solved after the transfers that feed it, so a
/// model sees the freshest output of every model registered before it. A
/// transfer is scheduled ahead of the first registered model it targets;
/// transfers targeting no registered model run at the end of the pass.
#[derive(Debug, Clone, Default)]
pub struct GaussSeidel {
    /// Transfer indices to run before each model, by model index.
    feeds: Vec<Vec<usize>>,
    trailing: Vec<usize>,
}

impl GaussSeidel {
    /// Assigns each transfer to the first registered model it targets.
    ///
    /// A transfer with several targets runs once per pass, not once before
    /// each of them.
    fn schedule(&mut self, models: &[ModelHandle], transfers: &[TransferHandle]) {
        self.feeds = vec![Vec::new(); models.len()];
        self.trailing.clear();

        for (index, transfer) in transfers.iter().enumerate() {
            let transfer = transfer.borrow();
            let first_target = models
                .iter()
                .position(|m| transfer.targets(m.borrow().name()));
            match first_target {
                Some(model) => self.feeds[model].push(index),
                None => self.trailing.push(index),
            }
        }
    }
}

fn run(transfers: &[TransferHandle], indices: &[usize]) -> Result<(), Error> {
    for &index in indices {
        transfers[index].borrow_mut().do_transfer()?;
    }
    Ok(())
}

impl CouplingStrategy for GaussSeidel {
    fn type_name(&self) -> &'static str {
        "Block Gauss Seidel"
    }

    fn complete_registration(
        &mut self,
        models: &[ModelHandle],
        transfers: &[TransferHandle],
    ) -> Result<(), Error> {
        self.schedule(models, transfers);
        Ok(())
    }

    fn step(
        &mut self,
        models: &[ModelHandle],
        transfers: &[TransferHandle],
    ) -> Result<StepOutcome, Error> {
        for (model, feeds) in models.iter().zip(&self.feeds) {
            run(transfers, feeds)?;
            if !model.borrow_mut().solve()? {
                tracing::debug!(model = model.borrow().name(), "model solve failed");
                return Ok(StepOutcome::Failed);
            }
        }
        run(transfers, &self.trailing)?;
        Ok(StepOutcome::Continue)
    }
}
