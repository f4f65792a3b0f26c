//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; every error reaches the wire as JSON of the shape
//! `{"message": "..."}`.

use axum::Json;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use brightspoke_core::AccountId;

use crate::services::auth::AuthError;
use crate::store::StoreError;

/// Application-level error type for the storefront backend.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication or provisioning failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Document store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Malformed request body or parameters.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Auth(err) => match err {
                AuthError::EmailExists
                | AuthError::UserNotFound
                | AuthError::InvalidPassword
                | AuthError::MissingField(_)
                | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::Store(err) => store_status(err),
            },
            Self::Store(err) => store_status(err),
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        };

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "request failed"
            );
        }

        // Client-facing messages; internal detail stays out of responses
        let message = match &self {
            Self::Auth(err) => match err {
                AuthError::EmailExists => "Email already exists".to_owned(),
                AuthError::UserNotFound => "User not found".to_owned(),
                AuthError::InvalidPassword => "Invalid password".to_owned(),
                AuthError::MissingField(_) | AuthError::InvalidEmail(_) => err.to_string(),
                AuthError::PasswordHash => "Internal server error".to_owned(),
                AuthError::Store(err) => store_message(err),
            },
            Self::Store(err) => store_message(err),
            Self::Validation(message) => message.clone(),
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) => StatusCode::BAD_REQUEST,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::DataCorruption(_) | StoreError::IdsExhausted { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn store_message(err: &StoreError) -> String {
    match err {
        StoreError::NotFound(entity) => format!("{entity} not found"),
        StoreError::Conflict(message) => message.clone(),
        StoreError::Unavailable(_) => "Service temporarily unavailable".to_owned(),
        StoreError::DataCorruption(_) | StoreError::IdsExhausted { .. } => {
            "Internal server error".to_owned()
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// JSON extractor whose rejection matches the error wire shape.
///
/// Axum's stock `Json` answers malformed bodies with plain-text 400/422
/// responses; routing the rejection through `AppError` keeps every body
/// problem a 400 with a `{"message": ...}` payload.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// Set the Sentry user context from an account id.
///
/// Call this after successful authentication to associate errors with
/// accounts.
pub fn set_sentry_user(account_id: AccountId, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(account_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
