//! Command registration errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("parameter declaration {0:?} has an empty name")]
    EmptyParameterName(String),

    #[error("flag {0:?} must not declare a default value")]
    FlagWithDefault(String),

    #[error("optional parameter {optional:?} declared before required parameter {required:?}")]
    OptionalBeforeRequired { optional: String, required: String },

    #[error("duplicate parameter name {0:?}")]
    DuplicateParameter(String),

    #[error("command name is empty")]
    EmptyCommandName,

    #[error("command {0:?} is already registered")]
    AlreadyRegistered(String),

    #[error("parent command {0:?} is not registered")]
    UnknownParent(String),
}
