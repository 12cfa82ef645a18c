use std::{error::Error as StdError, fmt};

use thiserror::Error;

use crate::ConfigError;

/// The kind of named entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    ModelEvaluator,
    DataTransfer,
    Parameter,
    Response,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ModelEvaluator => "model evaluator",
            Self::DataTransfer => "data transfer",
            Self::Parameter => "parameter",
            Self::Response => "response",
        })
    }
}

/// Fatal errors raised by the coupling engine.
///
/// Every variant is a usage, lookup, or configuration problem that the engine
/// cannot recover from. A solve that ends in [`SolveStatus::Failed`] is not an
/// error and is never reported through this type.
///
/// [`SolveStatus::Failed`]: crate::SolveStatus::Failed
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot register {kind} `{name}` after registration has been completed")]
    RegistrationClosed { kind: EntityKind, name: String },

    #[error("registration has already been completed")]
    RegistrationAlreadyComplete,

    #[error("solver `{solver}` cannot solve before registration is completed")]
    RegistrationIncomplete { solver: String },

    #[error("solver `{solver}` has no status tests")]
    MissingStatusTests { solver: String },

    #[error("`{solver}` has no inner solver")]
    MissingInnerSolver { solver: String },

    #[error("no model evaluator named `{name}`; valid models are: [{}]", .valid.join(", "))]
    UnknownModel { name: String, valid: Vec<String> },

    #[error("no data transfer named `{name}`; valid transfers are: [{}]", .valid.join(", "))]
    UnknownTransfer { name: String, valid: Vec<String> },

    #[error("model `{model}` has no parameter named `{name}`")]
    UnknownParameter { model: String, name: String },

    #[error("model `{model}` has no response named `{name}`")]
    UnknownResponse { model: String, name: String },

    #[error("parameter index {index} is out of range for model `{model}` ({len} parameters)")]
    ParameterIndex {
        model: String,
        index: usize,
        len: usize,
    },

    #[error("response index {index} is out of range for model `{model}` ({len} responses)")]
    ResponseIndex {
        model: String,
        index: usize,
        len: usize,
    },

    #[error("parameter `{name}` of model `{model}` cannot be set")]
    ReadOnlyParameter { model: String, name: String },

    #[error("{kind} name `{name}` is declared by more than one model")]
    NameCollision { kind: EntityKind, name: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("model `{model}` failed: {source}")]
    Model {
        model: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("data transfer `{transfer}` failed: {source}")]
    Transfer {
        transfer: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    /// Wraps an error raised inside a model evaluator.
    pub fn model<E: StdError + Send + Sync + 'static>(model: impl Into<String>, err: E) -> Self {
        Self::Model {
            model: model.into(),
            source: Box::new(err),
        }
    }

    /// Wraps an error raised inside a data transfer.
    pub fn transfer<E: StdError + Send + Sync + 'static>(
        transfer: impl Into<String>,
        err: E,
    ) -> Self {
        Self::Transfer {
            transfer: transfer.into(),
            source: Box::new(err),
        }
    }
}
