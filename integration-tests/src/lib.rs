//! Reference models for Braid's cross-crate tests.

pub mod converge_after;
pub mod heat_conduction;
pub mod mock;

use std::{cell::RefCell, rc::Rc};

/// Wraps a value in the shared handle solvers expect.
pub fn shared<T>(value: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(value))
}
