use crate::engine::RowId;
use thiserror::Error;

/// Errors that can occur while converting a workflow document into a `Workflow`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("Failed to parse workflow JSON: {0}")]
    JsonParseError(String),

    #[error("Workflow document has no name (uid: '{0}')")]
    MissingName(String),
}

/// Errors reported by a `WorkflowResolver`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("Workflow '{0}' was not found")]
    NotFound(String),

    #[error("Workflow '{name}' is already running at call depth {depth}")]
    Recursive { name: String, depth: usize },

    #[error("Loading workflow '{name}' would exceed the maximum nesting depth of {max_depth}")]
    DepthExceeded { name: String, max_depth: usize },

    #[error("Workflow source unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Rejections of consumer input. The session keeps waiting on the row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Row {0} does not exist")]
    UnknownRow(RowId),

    #[error("Row {row} is a {found} step, expected {expected}")]
    WrongStepKind {
        row: RowId,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Answer '{answer}' is not offered on row {row}")]
    UnknownAnswer { row: RowId, answer: String },

    #[error("A value is required for row {0}")]
    EmptyValue(RowId),

    #[error("Value '{value}' for row {row} is not a valid {format}")]
    InvalidFormat {
        row: RowId,
        value: String,
        format: String,
    },

    #[error("Value '{value}' for row {row} does not match '{pattern}'")]
    ValidationFailed {
        row: RowId,
        value: String,
        pattern: String,
    },

    #[error("No workflow is running")]
    NoActiveWorkflow,

    #[error("Waiting for workflow '{0}' to load")]
    Suspended(String),
}

/// Errors from persisting or restoring a variable snapshot.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not access snapshot '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot encoding failed: {0}")]
    Encode(String),

    #[error("Snapshot decoding failed: {0}")]
    Decode(String),
}

/// Errors raised while loading an `EngineConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
