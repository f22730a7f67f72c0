/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Error types for the Keycloak admin client
//!
//! Every public operation returns [`AppError`]. HTTP failures coming back from
//! Keycloak carry an [`ApiError`] with the status code and response body so the
//! caller can report them verbatim.

use reqwest::{Method, StatusCode};
use std::fmt;

/// A non-2xx response returned by Keycloak
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response
    pub status: StatusCode,
    /// HTTP method of the request that failed
    pub method: Method,
    /// URL path of the request that failed
    pub path: String,
    /// Response body as text, possibly empty
    pub body: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(
        status: StatusCode,
        method: Method,
        path: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            status,
            method,
            path: path.into(),
            body: body.into(),
        }
    }

    /// Numeric status code
    #[must_use]
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Whether Keycloak rejected the bearer token (401 or 403)
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED || self.status == StatusCode::FORBIDDEN
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error sending {} request to {}: {}.",
            self.method, self.path, self.status
        )?;
        if !self.body.is_empty() {
            write!(f, " Response body: {}", self.body)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Main error type for the library
#[derive(Debug)]
pub enum AppError {
    /// Login or token refresh failed, or the refreshed token was rejected again
    Authentication {
        /// Status code returned by Keycloak, `None` when no response was received
        status: Option<StatusCode>,
        /// Diagnostic message, including the response body when available
        message: String,
    },
    /// Keycloak answered 404
    NotFound(ApiError),
    /// Keycloak answered with any other non-2xx status
    Api(ApiError),
    /// Keycloak rejected the bearer token; resolved by the single refresh-and-retry
    /// inside the client and never returned from a public operation
    TokenRejected(ApiError),
    /// Network, TLS or timeout failure
    Network(reqwest::Error),
    /// JSON encoding or decoding failure
    Json(serde_json::Error),
    /// I/O failure
    Io(std::io::Error),
    /// Invalid or incomplete client configuration
    Config(String),
    /// Invalid argument passed by the caller
    InvalidInput(String),
    /// Server version could not be determined or parsed
    Version(String),
}

impl AppError {
    /// Builds an authentication error from a failed token-endpoint exchange
    pub fn authentication(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        AppError::Authentication {
            status,
            message: message.into(),
        }
    }

    /// Classifies a non-2xx response
    pub fn from_response(error: ApiError) -> Self {
        if error.status == StatusCode::NOT_FOUND {
            AppError::NotFound(error)
        } else if error.is_auth_failure() {
            AppError::TokenRejected(error)
        } else {
            AppError::Api(error)
        }
    }

    /// HTTP status attached to this error, if any
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::NotFound(e) | AppError::Api(e) | AppError::TokenRejected(e) => {
                Some(e.status)
            }
            AppError::Authentication { status, .. } => *status,
            AppError::Network(e) => e.status(),
            _ => None,
        }
    }

    /// True only for a 404 answer
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// True only for a 409 answer
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Api(e) if e.status == StatusCode::CONFLICT)
    }

    /// True for login/refresh failures
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, AppError::Authentication { .. })
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Authentication { status, message } => match status {
                Some(status) => write!(f, "authentication error ({status}): {message}"),
                None => write!(f, "authentication error: {message}"),
            },
            AppError::NotFound(e) | AppError::Api(e) | AppError::TokenRejected(e) => {
                write!(f, "{e}")
            }
            AppError::Network(e) => write!(f, "network error: {e}"),
            AppError::Json(e) => write!(f, "json error: {e}"),
            AppError::Io(e) => write!(f, "io error: {e}"),
            AppError::Config(msg) => write!(f, "configuration error: {msg}"),
            AppError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            AppError::Version(msg) => write!(f, "version error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::NotFound(e) | AppError::Api(e) | AppError::TokenRejected(e) => Some(e),
            AppError::Network(e) => Some(e),
            AppError::Json(e) => Some(e),
            AppError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Network(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e)
    }
}

/// Returns true when `err` is Keycloak's 404 answer
///
/// Resource readers use this to drop a resource from state instead of failing.
#[must_use]
pub fn error_is_404(err: &AppError) -> bool {
    err.is_not_found()
}

/// Returns true when `err` is Keycloak's 409 answer
#[must_use]
pub fn error_is_409(err: &AppError) -> bool {
    err.is_conflict()
}
