use std::fmt;

use braid_core::{Error, SolveStatus, Solver, StatusTest};

use super::write_line;

/// Fails the solve once it has taken `maximum` steps.
#[derive(Debug, Clone)]
pub struct MaxIterations {
    maximum: usize,
    iterations: usize,
    status: SolveStatus,
}

impl MaxIterations {
    #[must_use]
    pub fn new(maximum: usize) -> Self {
        Self {
            maximum,
            iterations: 0,
            status: SolveStatus::Unchecked,
        }
    }

    #[must_use]
    pub fn maximum(&self) -> usize {
        self.maximum
    }
}

impl StatusTest for MaxIterations {
    fn check_status(&mut self, solver: &dyn Solver) -> Result<SolveStatus, Error> {
        self.iterations = solver.number_of_iterations();
        self.status = if self.iterations >= self.maximum {
            SolveStatus::Failed
        } else {
            SolveStatus::Unconverged
        };
        Ok(self.status)
    }

    fn status(&self) -> SolveStatus {
        self.status
    }

    fn reset(&mut self) {
        self.iterations = 0;
        self.status = SolveStatus::Unchecked;
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write_line(
            f,
            indent,
            self.status,
            format_args!(
                "Number of Iterations = {} < {}",
                self.iterations, self.maximum
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use braid_core::ModelHandle;

    use crate::{
        status_tests::fixtures,
        test_utils::{Probe, handle, journal},
    };

    #[test]
    fn fails_at_the_limit() {
        let journal = journal();
        let model: ModelHandle = handle(Probe::new("a", &journal));
        let mut solver = fixtures::solver(&[model]);
        let mut test = MaxIterations::new(2);

        assert_eq!(test.check_status(&solver).unwrap(), SolveStatus::Unconverged);
        solver.step().unwrap();
        assert_eq!(test.check_status(&solver).unwrap(), SolveStatus::Unconverged);
        solver.step().unwrap();
        assert_eq!(test.check_status(&solver).unwrap(), SolveStatus::Failed);
        assert_eq!(test.status(), SolveStatus::Failed);

        test.reset();
        assert_eq!(test.status(), SolveStatus::Unchecked);
    }

    #[test]
    fn bounds_a_solve() {
        let journal = journal();
        let model: ModelHandle = handle(Probe::new("a", &journal));
        let mut solver = fixtures::solver(&[model]);
        solver.set_status_tests(Box::new(MaxIterations::new(5)));

        assert_eq!(solver.solve().unwrap(), SolveStatus::Failed);
        assert_eq!(solver.number_of_iterations(), 5);
    }

    #[test]
    fn renders_one_line() {
        let test: Box<dyn StatusTest> = Box::new(MaxIterations::new(20));
        assert_eq!(
            test.to_string(),
            "UNCHECKED   Number of Iterations = 0 < 20\n"
        );
    }
}
