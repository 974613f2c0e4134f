//! Mapping of service errors onto HTTP responses.

use crate::registry::{
    domain::{ErrorBody, ErrorKind, ToolCallResponse},
    services::{InvocationRouterError, RegistryServiceError},
};
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Error returned by HTTP handlers.
///
/// Rendered as a failed [`ToolCallResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Builds an error with an explicit status and kind.
    #[must_use]
    pub fn new(status: StatusCode, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                kind,
                message: message.into(),
                upstream_status: None,
            },
        }
    }

    /// Builds a `400 validation_error`.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorKind::ValidationError, message)
    }

    /// Builds a `404 not_found`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorKind::NotFound, message)
    }

    fn internal(detail: &impl std::fmt::Display) -> Self {
        error!(error = %detail, "request failed with internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::InternalError,
            "internal registry error",
        )
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.body.kind
    }
}

impl From<RegistryServiceError> for ApiError {
    fn from(err: RegistryServiceError) -> Self {
        match &err {
            RegistryServiceError::Validation(source) => Self::validation(source.to_string()),
            RegistryServiceError::NotFound(_) => Self::not_found(err.to_string()),
            RegistryServiceError::Store(source) => Self::internal(source),
        }
    }
}

impl From<InvocationRouterError> for ApiError {
    fn from(err: InvocationRouterError) -> Self {
        match &err {
            InvocationRouterError::NotFound(_) => Self::not_found(err.to_string()),
            InvocationRouterError::UnknownCapability { .. } => Self::new(
                StatusCode::NOT_FOUND,
                ErrorKind::UnknownCapability,
                err.to_string(),
            ),
            InvocationRouterError::Validation(source) => Self::validation(source.to_string()),
            InvocationRouterError::ServerUnavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::ServerUnavailable,
                err.to_string(),
            ),
            InvocationRouterError::Invocation { source, .. } => {
                let upstream_status = source.upstream_status();
                let mut api_error =
                    Self::new(StatusCode::BAD_GATEWAY, ErrorKind::InvocationError, err.to_string());
                api_error.body.upstream_status = upstream_status;
                api_error
            }
            InvocationRouterError::Store(source) => Self::internal(source),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ToolCallResponse::Error { error: self.body })).into_response()
    }
}
