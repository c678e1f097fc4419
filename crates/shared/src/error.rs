use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown to the user whenever a command failure carries no displayable text.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "The action could not be completed. Please try again later.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Body returned to asynchronous clients when a command fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeMessage {
    pub message: String,
}

/// Failure while executing a command.
///
/// Only [`CommandError::Rejected`] carries text that may be shown to a user;
/// the other variants are logged and replaced by [`GENERIC_FAILURE_MESSAGE`].
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Rejected(String),
    #[error("no handler registered for command `{0}`")]
    Unhandled(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CommandError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn safe_message(&self) -> String {
        match self {
            Self::Rejected(message) => message.clone(),
            Self::Unhandled(_) | Self::Internal(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<&CommandError> for SafeMessage {
    fn from(value: &CommandError) -> Self {
        Self {
            message: value.safe_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_is_shown_verbatim() {
        let err = CommandError::rejected("username is already taken");
        assert_eq!(err.safe_message(), "username is already taken");
    }

    #[test]
    fn internal_detail_is_never_exposed() {
        let err = CommandError::from(anyhow::anyhow!("UNIQUE constraint failed: users.email"));
        assert_eq!(err.safe_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(
            SafeMessage::from(&err),
            SafeMessage {
                message: GENERIC_FAILURE_MESSAGE.to_string()
            }
        );
    }
}
