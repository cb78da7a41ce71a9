//! Error types shared across the interaction pipeline.
//!
//! None of these escape [`CommandExecutor::execute`](crate::command::CommandExecutor::execute):
//! the executor folds every error into a failed [`CommandResult`](crate::command::CommandResult).

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by command bodies and the undo/redo machinery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No command is registered under this id.
    #[error("Command '{0}' not found")]
    NotFound(String),
    /// The payload was rejected by `validate`.
    #[error("{0}")]
    Validation(String),
    /// The command body failed while running.
    #[error("{0}")]
    Execution(String),
    /// The command (or the history entry's command) cannot be reverted.
    #[error("Command is not undoable")]
    NotUndoable,
    /// The command's `undo` reported a failure.
    #[error("Undo failed: {0}")]
    UndoFailed(String),
    /// The command observed its cancellation signal.
    #[error("Command '{0}' was cancelled")]
    Cancelled(String),
    /// A dispatch for the same command id is still in flight.
    #[error("Command '{0}' is already running")]
    AlreadyRunning(String),
    /// A collaborator surface rejected the mutation.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl CommandError {
    /// Shorthand for an execution failure with a message.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}

/// Failures reported by the graph, selection and panel surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("Node {0} not found")]
    NodeNotFound(i32),
    #[error("Connection {0} not found")]
    ConnectionNotFound(i32),
    #[error("Node {0} already exists")]
    DuplicateNode(i32),
    #[error("Connection {0} already exists")]
    DuplicateConnection(i32),
    #[error("{0}")]
    Rejected(String),
}

/// Errors raised while loading [`EditorSettings`](crate::config::EditorSettings).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Errors raised while parsing a target selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character '{ch}' at offset {offset} in selector '{selector}'")]
    UnexpectedChar {
        selector: String,
        ch: char,
        offset: usize,
    },
}
