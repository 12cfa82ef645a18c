use std::fmt;

use braid_core::{Error, SolveStatus, Solver, StatusTest};

use super::write_line;

/// How a [`Composite`] combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combo {
    /// Converged only if every child converged; failed if any child failed.
    And,

    /// The verdict of the first child that is not unconverged.
    Or,
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
        })
    }
}

/// A status test combining the verdicts of its children.
///
/// Every child is checked on every check, so each child's status stays
/// current for rendering. An empty composite is unconverged.
pub struct Composite {
    combo: Combo,
    tests: Vec<Box<dyn StatusTest>>,
    status: SolveStatus,
}

impl Composite {
    #[must_use]
    pub fn new(combo: Combo) -> Self {
        Self {
            combo,
            tests: Vec::new(),
            status: SolveStatus::Unchecked,
        }
    }

    #[must_use]
    pub fn and() -> Self {
        Self::new(Combo::And)
    }

    #[must_use]
    pub fn or() -> Self {
        Self::new(Combo::Or)
    }

    /// Adds a child, builder style.
    #[must_use]
    pub fn with(mut self, test: impl StatusTest + 'static) -> Self {
        self.tests.push(Box::new(test));
        self
    }

    pub fn add_test(&mut self, test: Box<dyn StatusTest>) {
        self.tests.push(test);
    }

    #[must_use]
    pub fn combo(&self) -> Combo {
        self.combo
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    fn combine(&self, verdicts: &[SolveStatus]) -> SolveStatus {
        if verdicts.is_empty() {
            return SolveStatus::Unconverged;
        }
        match self.combo {
            Combo::Or => verdicts
                .iter()
                .copied()
                .find(|&s| s != SolveStatus::Unconverged)
                .unwrap_or(SolveStatus::Unconverged),
            Combo::And => {
                if verdicts.contains(&SolveStatus::Failed) {
                    SolveStatus::Failed
                } else if verdicts.iter().all(|&s| s == SolveStatus::Converged) {
                    SolveStatus::Converged
                } else {
                    SolveStatus::Unconverged
                }
            }
        }
    }
}

impl StatusTest for Composite {
    fn check_status(&mut self, solver: &dyn Solver) -> Result<SolveStatus, Error> {
        let verdicts = self
            .tests
            .iter_mut()
            .map(|test| test.check_status(solver))
            .collect::<Result<Vec<_>, _>>()?;
        self.status = self.combine(&verdicts);
        Ok(self.status)
    }

    fn status(&self) -> SolveStatus {
        self.status
    }

    fn reset(&mut self) {
        self.status = SolveStatus::Unchecked;
        for test in &mut self.tests {
            test.reset();
        }
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write_line(f, indent, self.status, format_args!("Composite {}", self.combo))?;
        for test in &self.tests {
            test.describe(f, indent + 2)?;
        }
        Ok(())
    }
}
