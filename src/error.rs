//! Error types and handling for the boba-map service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the boba-map service
#[derive(Error, Debug)]
pub enum BobaError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// No acting user on a request that needs one
    #[error("Not authenticated")]
    Unauthenticated,

    /// Acting user lacks the required role or membership
    #[error("Not authorized: {message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    /// Request clashes with existing state (duplicate member, pending request, ...)
    #[error("{message}")]
    Conflict { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl BobaError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            BobaError::Validation { .. } => StatusCode::BAD_REQUEST,
            BobaError::Unauthenticated => StatusCode::UNAUTHORIZED,
            BobaError::Forbidden { .. } => StatusCode::FORBIDDEN,
            BobaError::NotFound { .. } => StatusCode::NOT_FOUND,
            BobaError::Conflict { .. } => StatusCode::CONFLICT,
            BobaError::Config { .. } | BobaError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BobaError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            BobaError::Validation { message }
            | BobaError::Forbidden { message }
            | BobaError::NotFound { message }
            | BobaError::Conflict { message } => message.clone(),
            BobaError::Unauthenticated => "Not authenticated".to_string(),
            BobaError::Io { .. } => "Something went wrong on our side. Please try again.".to_string(),
        }
    }
}

impl IntoResponse for BobaError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}
