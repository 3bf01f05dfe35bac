//! Errors raised while constructing actions

use thiserror::Error;

/// Machine-checkable category of an [`ActionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionErrorCode {
    OutOfMemory,
    InvalidParameterType,
    InvalidNumberOfParameters,
    UnknownKeyword,
    ParseError,
}

/// Action construction failure
///
/// Construction either returns a complete action or one of these; nothing
/// partially built escapes.
#[derive(Debug, Clone, Error)]
pub enum ActionError {
    /// A parameter has the wrong type for its position
    #[error("{message}")]
    InvalidParameterType { keyword: String, message: String },

    /// Too few or too many parameters
    #[error("{message}")]
    InvalidNumberOfParameters { keyword: String, message: String },

    /// No constructor is registered for the keyword
    #[error("unknown action '{0}'")]
    UnknownKeyword(String),

    /// Action text is not syntactically valid
    #[error("parse error at {position}: {message}")]
    Parse { position: usize, message: String },

    /// Storage for the action could not be allocated
    #[error("out of memory")]
    OutOfMemory,
}

impl ActionError {
    pub fn code(&self) -> ActionErrorCode {
        match self {
            ActionError::InvalidParameterType { .. } => ActionErrorCode::InvalidParameterType,
            ActionError::InvalidNumberOfParameters { .. } => {
                ActionErrorCode::InvalidNumberOfParameters
            },
            ActionError::UnknownKeyword(_) => ActionErrorCode::UnknownKeyword,
            ActionError::Parse { .. } => ActionErrorCode::ParseError,
            ActionError::OutOfMemory => ActionErrorCode::OutOfMemory,
        }
    }

    pub(crate) fn invalid_type(keyword: &str, message: impl Into<String>) -> Self {
        ActionError::InvalidParameterType {
            keyword: keyword.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_count(keyword: &str, message: impl Into<String>) -> Self {
        ActionError::InvalidNumberOfParameters {
            keyword: keyword.to_string(),
            message: message.into(),
        }
    }
}
