//! Domain error types for promptframe

use thiserror::Error;

/// Failures of the analysis and suggestion clients.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Caller input failed a precondition. Never retried.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The endpoint kept answering 429 until the attempt ceiling was reached.
    #[error("API rate limit exceeded after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Non-2xx status, transport failure, timeout or an unreadable payload.
    #[error("Upstream unavailable: {message}")]
    Unavailable { message: String },
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        ClientError::Unavailable {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Unavailable {
            message: format!("Malformed response payload: {err}"),
        }
    }
}

/// Rejections when creating, editing or accepting variables.
///
/// These are recoverable, user-facing conditions: the draft is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariableError {
    #[error("Variable name \"{name}\" already exists! Please choose another one.")]
    NameCollision { name: String },

    #[error("Please provide a name for the variable.")]
    MissingName,

    #[error("Please select a word or phrase for the variable.")]
    MissingWord,

    #[error("No variable named \"{name}\"")]
    Unknown { name: String },

    #[error("No pending suggestion at position {index}")]
    NoSuchSuggestion { index: usize },
}

/// Reasons a framework cannot be handed to a library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("Please provide a name for your framework.")]
    MissingName,

    #[error("Please provide text for your framework.")]
    MissingText,

    #[error("Please add at least one variable to your framework.")]
    NoVariables,
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Cannot build a matcher for \"{word}\": {source}")]
    Pattern {
        word: String,
        #[source]
        source: regex::Error,
    },
}
