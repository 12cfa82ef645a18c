use std::collections::HashMap;

use braid_core::{EntityKind, Error, ModelHandle};

/// Where a global parameter or response lives in the wrapped solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Index of the model in the solver's registration order.
    pub model: usize,
    /// Index of the parameter or response within that model.
    pub local: usize,
}

/// How the namespace treats a name declared by more than one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamePolicy {
    /// The model registered last owns the name. Every entry keeps its global
    /// index, but name lookups resolve to the last one.
    #[default]
    LastWins,

    /// A repeated name is an [`Error::NameCollision`].
    Reject,
}

/// One direction of the namespace: either parameters or responses.
#[derive(Debug, Clone, Default)]
struct Table {
    names: Vec<String>,
    locations: Vec<Location>,
    by_name: HashMap<String, usize>,
}

impl Table {
    fn insert(
        &mut self,
        kind: EntityKind,
        name: &str,
        location: Location,
        policy: NamePolicy,
    ) -> Result<(), Error> {
        let index = self.names.len();
        if let Some(previous) = self.by_name.insert(name.to_owned(), index) {
            if policy == NamePolicy::Reject {
                return Err(Error::NameCollision {
                    kind,
                    name: name.to_owned(),
                });
            }
            tracing::debug!(%kind, name, previous, index, "later model shadows name");
        }
        self.names.push(name.to_owned());
        self.locations.push(location);
        Ok(())
    }
}

/// The union of the parameter and response names of a solver's models.
///
/// Global indices are assigned model by model in registration order, and
/// within a model in local index order.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    parameters: Table,
    responses: Table,
}

impl Namespace {
    /// Builds the namespace of `models`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NameCollision`] under [`NamePolicy::Reject`] if two
    /// models declare the same parameter or response name.
    pub fn build(models: &[ModelHandle], policy: NamePolicy) -> Result<Self, Error> {
        let mut namespace = Self::default();
        for (model_index, model) in models.iter().enumerate() {
            let model = model.borrow();
            for (local, name) in model.parameter_names().iter().enumerate() {
                let location = Location {
                    model: model_index,
                    local,
                };
                namespace
                    .parameters
                    .insert(EntityKind::Parameter, name, location, policy)?;
            }
            for (local, name) in model.response_names().iter().enumerate() {
                let location = Location {
                    model: model_index,
                    local,
                };
                namespace
                    .responses
                    .insert(EntityKind::Response, name, location, policy)?;
            }
        }
        Ok(namespace)
    }

    #[must_use]
    pub fn parameter_names(&self) -> &[String] {
        &self.parameters.names
    }

    #[must_use]
    pub fn parameter(&self, index: usize) -> Option<Location> {
        self.parameters.locations.get(index).copied()
    }

    #[must_use]
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameters.by_name.get(name).copied()
    }

    #[must_use]
    pub fn response_names(&self) -> &[String] {
        &self.responses.names
    }

    #[must_use]
    pub fn response(&self, index: usize) -> Option<Location> {
        self.responses.locations.get(index).copied()
    }

    #[must_use]
    pub fn response_index(&self, name: &str) -> Option<usize> {
        self.responses.by_name.get(name).copied()
    }
}
