//! Error handling.

use axum::{
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error;
use thiserror::Error;
use tokio::sync::AcquireError;
use tracing::{event, Level};

/// Weather panel error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Error querying the sample table
    #[error("error querying the weather database")]
    Database(#[from] sqlx::Error),

    /// Attempt to perform a statistical operation on an empty sample
    #[error("cannot compute {operation} on an empty sample")]
    EmptySample { operation: &'static str },

    /// Attempt to perform a statistical operation on a constant or non-finite sample
    #[error("cannot compute {operation} on a sample with zero variance")]
    DegenerateSample { operation: &'static str },

    /// Paired series of different lengths
    #[error("cannot pair series of lengths {x_len} and {y_len}")]
    MismatchedSeries { x_len: usize, y_len: usize },

    /// Correlation request without both variables selected
    #[error("No variables selected. Go back and select two variables.")]
    NoVariablesSelected,

    /// Field name outside the allow-list of known columns
    #[error("unknown field name {name}")]
    UnknownField { name: String },

    /// Error drawing a chart
    #[error("failed to render chart: {reason}")]
    Render { reason: String },

    /// Error encoding a rendered chart as PNG
    #[error("failed to encode chart as PNG")]
    PngEncode(#[from] image::ImageError),

    /// Error acquiring a semaphore
    #[error("error acquiring resources")]
    SemaphoreAcquireError(#[from] AcquireError),

    /// Error joining a blocking rendering task
    #[error("error waiting for rendering task")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl IntoResponse for PanelError {
    /// Convert from a `PanelError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// A response to send in error cases
///
/// The body is plain text: the main message followed by one line per cause.
struct ErrorResponse {
    /// HTTP status of the response
    status: StatusCode,

    /// Main error message
    message: String,

    /// List of causes
    caused_by: Vec<String>,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. Its source chain is flattened into `caused_by`.
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut caused_by = Vec::new();
        let mut current = error.source();
        while let Some(source) = current {
            caused_by.push(source.to_string());
            current = source.source();
        }
        // Remove duplicate entries.
        caused_by.dedup();
        ErrorResponse {
            status,
            message,
            caused_by,
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<PanelError> for ErrorResponse {
    /// Convert from a `PanelError` into an `ErrorResponse`.
    fn from(error: PanelError) -> Self {
        let response = match &error {
            // Bad request
            PanelError::NoVariablesSelected | PanelError::UnknownField { name: _ } => {
                Self::bad_request(&error)
            }

            // Internal server error
            PanelError::Database(_)
            | PanelError::EmptySample { operation: _ }
            | PanelError::DegenerateSample { operation: _ }
            | PanelError::MismatchedSeries { x_len: _, y_len: _ }
            | PanelError::Render { reason: _ }
            | PanelError::PngEncode(_)
            | PanelError::SemaphoreAcquireError(_)
            | PanelError::TaskJoin(_) => Self::internal_server_error(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as plain text, one cause per line.
    fn into_response(self) -> Response {
        let mut body = self.message;
        for cause in &self.caused_by {
            body.push_str("\ncaused by: ");
            body.push_str(cause);
        }
        (
            self.status,
            [(&header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string())],
            body,
        )
            .into_response()
    }
}
