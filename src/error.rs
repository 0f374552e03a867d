//! Unified error type.
//!
//! Handlers return `Result<_, Error>` and use `?` freely. Converting an
//! [`Error`] into a response never fails: aborts keep their status, bad input
//! becomes `400`, and everything else is logged and becomes `500`. The
//! resulting response is marked as aborted so registered error handlers run.

use std::fmt;

use http::StatusCode;
use thiserror::Error;
use tracing::{debug, error};

use crate::response::{IntoResponse, Response};

/// The error type returned by flagon's fallible operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Settings(#[from] config::ConfigError),

    #[error("template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("multipart: {0}")]
    Multipart(#[from] multer::Error),

    #[error("could not build url for endpoint `{endpoint}`: {reason}")]
    Build { endpoint: String, reason: String },

    #[error("missing form field `{0}`")]
    MissingField(String),

    #[error("missing uploaded file `{0}`")]
    MissingFile(String),

    #[error("{0}")]
    Abort(HttpError),
}

/// Stops the current handler with an HTTP error status.
///
/// ```rust
/// use flagon::{abort, Error, Request, StatusCode};
///
/// async fn not_found(_req: Request) -> Result<&'static str, Error> {
///     Err(abort(StatusCode::NOT_FOUND))
/// }
/// ```
pub fn abort(status: StatusCode) -> Error {
    Error::Abort(HttpError::new(status))
}

/// An HTTP error raised by a handler or by the framework itself.
///
/// Error handlers registered with
/// [`AppBuilder::on_error`](crate::AppBuilder::on_error) receive this value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpError {
    status: StatusCode,
    description: Option<String>,
}

impl HttpError {
    pub fn new(status: StatusCode) -> Self {
        Self { status, description: None }
    }

    pub fn with_description(status: StatusCode, description: impl Into<String>) -> Self {
        Self { status, description: Some(description.into()) }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The reason phrase, e.g. `"Not Found"`.
    pub fn name(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown Error")
    }

    /// A human-readable explanation, falling back to a stock sentence for
    /// the common statuses.
    pub fn description(&self) -> &str {
        if let Some(description) = &self.description {
            return description;
        }
        match self.status {
            StatusCode::BAD_REQUEST => {
                "The browser (or proxy) sent a request that this server could not understand."
            }
            StatusCode::NOT_FOUND => {
                "The requested URL was not found on the server. If you entered the URL \
                 manually please check your spelling and try again."
            }
            StatusCode::METHOD_NOT_ALLOWED => "The method is not allowed for the requested URL.",
            StatusCode::INTERNAL_SERVER_ERROR => {
                "The server encountered an internal error and was unable to complete your \
                 request."
            }
            _ => "",
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.name())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        Response::aborted(self)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let http_error = match self {
            Self::Abort(http_error) => http_error,
            err @ (Self::MissingField(_) | Self::MissingFile(_) | Self::Multipart(_)) => {
                debug!(error = %err, "rejecting malformed request");
                HttpError::new(StatusCode::BAD_REQUEST)
            }
            err => {
                error!(error = %err, "request failed");
                HttpError::new(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };
        Response::aborted(http_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_keeps_status() {
        let response = abort(StatusCode::NOT_FOUND).into_response();
        assert_eq!(response.code(), StatusCode::NOT_FOUND);
        assert!(response.is_aborted());
    }

    #[test]
    fn missing_field_is_a_bad_request() {
        let response = Error::MissingField("username".into()).into_response();
        assert_eq!(response.code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_failures_are_internal_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let response = Error::from(io).into_response();
        assert_eq!(response.code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn custom_description_replaces_the_stock_text() {
        let err = HttpError::with_description(StatusCode::BAD_REQUEST, "username is <required>");
        assert_eq!(err.description(), "username is <required>");
        assert!(!HttpError::new(StatusCode::NOT_FOUND).description().is_empty());

        let response = err.into_response();
        let body = String::from_utf8_lossy(response.body()).into_owned();
        assert!(body.contains("<p>username is &lt;required&gt;</p>"));
    }

    #[test]
    fn display_uses_reason_phrase() {
        assert_eq!(HttpError::new(StatusCode::BAD_REQUEST).to_string(), "400 Bad Request");
    }
}
