//! The uniform error shape shared by transports and decorators.
//!
//! Transports translate their failures into [`RequestError`]. Whether an error
//! carries a [`Response`] is what lets the retry decorator tell a network
//! failure (no response) from a server error (response with a status).
//! Decorators pass errors through untouched, so a caller inspecting the error
//! after exhausted retries sees the same shape as a first-attempt failure.

use crate::response::Response;
use thiserror::Error;

/// Error returned by a [`Requestor`](crate::Requestor).
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// The request never produced a response (connection refused, DNS, reset).
    #[error("network error: {message}")]
    Network {
        /// Transport-provided description.
        message: String,
    },

    /// The server answered with an error status.
    #[error("request failed with status {}: {message}", .response.status)]
    Status {
        /// Transport-provided description.
        message: String,
        /// The error response.
        response: Box<Response>,
    },

    /// Any other failure raised below the decorators.
    #[error("{message}")]
    Other {
        /// Description of the failure.
        message: String,
    },
}

impl RequestError {
    /// Creates a [`RequestError::Network`].
    pub fn network(message: impl Into<String>) -> Self {
        RequestError::Network {
            message: message.into(),
        }
    }

    /// Creates a [`RequestError::Status`] from an error response.
    pub fn status(response: Response) -> Self {
        RequestError::Status {
            message: response.status_text.clone(),
            response: Box::new(response),
        }
    }

    /// Creates a [`RequestError::Other`].
    pub fn other(message: impl Into<String>) -> Self {
        RequestError::Other {
            message: message.into(),
        }
    }

    /// Returns the error response, if the server replied.
    pub fn response(&self) -> Option<&Response> {
        match self {
            RequestError::Status { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Returns the response status, if the server replied.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|response| response.status)
    }

    /// Returns `true` when no response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, RequestError::Network { .. })
    }
}
