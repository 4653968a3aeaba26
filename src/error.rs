// Client error types shared by the session store, REST client, gateway and controller
use std::collections::BTreeMap;
use thiserror::Error;

use crate::validation::Field;

/// Machine-readable failure category, used by the controller to pick a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    BadRequest,
    Forbidden,
    NotFound,
    Server,
    Network,
    Decode,
}

/// Tagged error carrying a kind plus a human-readable message
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    // Field-level rejections, from the form or a 400 naming the fields
    #[error("Please correct the highlighted fields")]
    Validation { field_errors: BTreeMap<Field, String> },

    // 401 or missing/expired session
    #[error("{0}")]
    Auth(String),

    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 5xx and anything else the server answers with
    #[error("{message}")]
    Server { status: Option<u16>, message: String },

    // No response at all (connect failure, timeout)
    #[error("{0}")]
    Network(String),

    // Response arrived but did not have the expected shape
    #[error("{0}")]
    Decode(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::Auth(_) => ErrorKind::Auth,
            ClientError::BadRequest(_) => ErrorKind::BadRequest,
            ClientError::Forbidden(_) => ErrorKind::Forbidden,
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::Server { .. } => ErrorKind::Server,
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Decode(_) => ErrorKind::Decode,
        }
    }

    /// HTTP status the error came from, when there was one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Auth(_) => Some(401),
            ClientError::BadRequest(_) => Some(400),
            ClientError::Forbidden(_) => Some(403),
            ClientError::NotFound(_) => Some(404),
            ClientError::Server { status, .. } => *status,
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Auth => "UNAUTHORIZED",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Server => "SERVER_ERROR",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Decode => "DECODE_ERROR",
        }
    }

    /// Message suitable for showing to the person at the keyboard
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn field_errors(&self) -> Option<&BTreeMap<Field, String>> {
        match self {
            ClientError::Validation { field_errors } => Some(field_errors),
            _ => None,
        }
    }

    /// Build the error for a non-success HTTP response. A message supplied by the
    /// server wins for 400 and 404; the other statuses use fixed wording.
    pub fn from_status(status: u16, server_message: Option<String>) -> Self {
        let server_message = server_message.filter(|m| !m.trim().is_empty());
        match status {
            400 | 422 => ClientError::BadRequest(
                server_message.unwrap_or_else(|| "The information provided is invalid.".to_string()),
            ),
            401 => ClientError::session_expired(),
            403 => ClientError::Forbidden("You do not have permission to perform this action.".to_string()),
            404 => ClientError::NotFound(
                server_message.unwrap_or_else(|| "The requested contact was not found.".to_string()),
            ),
            _ => ClientError::Server {
                status: Some(status),
                message: "A server error occurred. Please try again later.".to_string(),
            },
        }
    }
}

// Static constructor methods
impl ClientError {
    pub fn validation(field_errors: BTreeMap<Field, String>) -> Self {
        ClientError::Validation { field_errors }
    }

    pub fn session_expired() -> Self {
        ClientError::Auth("Your session has expired. Please log in again.".to_string())
    }

    pub fn not_logged_in() -> Self {
        ClientError::Auth("You are not logged in. Please log in again.".to_string())
    }

    pub fn network() -> Self {
        ClientError::Network("Unable to reach the server. Please check your connection.".to_string())
    }

    pub fn decode(detail: impl std::fmt::Display) -> Self {
        tracing::warn!("unexpected response body: {}", detail);
        ClientError::Decode("Received an unexpected response from the server.".to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ClientError::decode(err);
        }
        if let Some(status) = err.status() {
            return ClientError::from_status(status.as_u16(), None);
        }
        // Connect failures, timeouts and aborted bodies all mean no usable response
        tracing::warn!("transport error: {}", err);
        ClientError::network()
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::decode(err)
    }
}
