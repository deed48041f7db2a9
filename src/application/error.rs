//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Errors raised while loading settings or driving the editor from a script.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("script line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: ScriptParseError,
    },
}

/// Why a script line could not be turned into an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptParseError {
    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("{verb} needs {usage}")]
    MissingArguments {
        verb: &'static str,
        usage: &'static str,
    },

    #[error("invalid node id '{0}'")]
    InvalidNodeId(String),

    #[error("invalid position '{0}'")]
    InvalidPosition(String),
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
