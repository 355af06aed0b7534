//! Unified session error types.

use crate::shared::SessionState;
use thiserror::Error;

/// Top-level error returned by every fallible session operation.
#[derive(Error, Debug)]
pub enum SdkError {
    /// A command was invoked while the session was not `Connected`, or
    /// `connect` was invoked while the session was not `Disconnected`.
    #[error("Bad state: expected {expected}, session is {actual}")]
    InvalidSessionState {
        expected: SessionState,
        actual: SessionState,
    },

    #[error("Transport connect failed: {0}")]
    TransportConnect(String),

    /// The server answered but reported `executed=false`.
    #[error("Command failed: {message}")]
    CommandExecution { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl SdkError {
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, SdkError::InvalidSessionState { .. })
    }

    pub fn is_command_failure(&self) -> bool {
        matches!(self, SdkError::CommandExecution { .. })
    }

    /// Builds a `CommandExecution` error, falling back to the generic
    /// message when the server sent none.
    pub(crate) fn command_failed(message: Option<&str>) -> Self {
        let message = match message.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => "Request failed".to_string(),
        };
        SdkError::CommandExecution { message }
    }
}

/// Command-channel transport errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

/// Push-stream transport errors.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Connection closed: code={code:?} reason={reason}")]
    Closed { code: Option<u16>, reason: String },
}

/// Failure to project one wire record into its domain entity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("field '{key}': {reason}")]
    Field { key: &'static str, reason: String },

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("unknown update action '{0}'")]
    UnknownAction(String),

    #[error("malformed payload: {0}")]
    Payload(String),
}
