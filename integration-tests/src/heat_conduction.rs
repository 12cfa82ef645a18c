//! Steady one-dimensional conduction through a slab of unit thickness.
//!
//! Chaining several slabs through data transfers models a composite wall:
//! every slab but the last computes its right-face temperature from the heat
//! flux, and the last closes the problem by computing the flux from both
//! face temperatures.
//!
//! ```text
//! T_right = T_left - q / k        (Mode::RightTemperature)
//! q       = k (T_left - T_right)  (Mode::HeatFlux)
//! ```

use braid_core::{Error, ModelEvaluator};

/// Which quantity the slab computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Given `k`, `q`, and `T_left`, compute `T_right`.
    RightTemperature,
    /// Given `k`, `T_left`, and `T_right`, compute `q`.
    HeatFlux,
}

const K: usize = 0;
const Q: usize = 1;
const T_LEFT: usize = 2;
const T_RIGHT: usize = 3;

const NAMES: [&str; 4] = ["k", "q", "T_left", "T_right"];

/// A slab with analytic linear conduction.
///
/// Parameters and responses are both `k`, `q`, `T_left`, `T_right`, in that
/// order. Parameter and response names are prefixed with the slab name
/// (`"wall.T_right"`) so several slabs can share one namespace.
#[derive(Debug, Clone)]
pub struct LinearHeatConduction {
    name: String,
    mode: Mode,
    names: Vec<String>,
    values: [f64; 4],
    solved: bool,
}

impl LinearHeatConduction {
    pub fn new(name: impl Into<String>, mode: Mode) -> Self {
        let name = name.into();
        let names = NAMES.iter().map(|n| format!("{name}.{n}")).collect();
        Self {
            name,
            mode,
            names,
            values: [1.0, 0.0, 0.0, 0.0],
            solved: false,
        }
    }

    #[must_use]
    pub fn with_k(mut self, k: f64) -> Self {
        self.values[K] = k;
        self
    }

    #[must_use]
    pub fn with_t_left(mut self, t: f64) -> Self {
        self.values[T_LEFT] = t;
        self
    }

    #[must_use]
    pub fn with_t_right(mut self, t: f64) -> Self {
        self.values[T_RIGHT] = t;
        self
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn q(&self) -> f64 {
        self.values[Q]
    }

    #[must_use]
    pub fn t_left(&self) -> f64 {
        self.values[T_LEFT]
    }

    #[must_use]
    pub fn t_right(&self) -> f64 {
        self.values[T_RIGHT]
    }
}

impl ModelEvaluator for LinearHeatConduction {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&mut self) -> Result<bool, Error> {
        let [k, q, t_left, t_right] = self.values;
        match self.mode {
            Mode::RightTemperature => self.values[T_RIGHT] = t_left - q / k,
            Mode::HeatFlux => self.values[Q] = k * (t_left - t_right),
        }
        self.solved = true;
        Ok(true)
    }

    fn is_locally_converged(&self) -> bool {
        self.solved
    }

    fn parameter_names(&self) -> &[String] {
        &self.names
    }

    fn set_parameter(&mut self, index: usize, values: &[f64]) -> Result<(), Error> {
        self.parameter_name(index)?;
        if let Some(&value) = values.first() {
            self.values[index] = value;
        }
        Ok(())
    }

    fn response_names(&self) -> &[String] {
        &self.names
    }

    fn response(&self, index: usize) -> Result<Vec<f64>, Error> {
        self.response_name(index)?;
        Ok(vec![self.values[index]])
    }
}
