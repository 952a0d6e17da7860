//! # Error Handling
//!
//! A single error type covers both the HTTP-facing resource operations and the
//! offline seeding pipeline:
//! - Returns appropriate HTTP status codes for request-serving failures
//! - Sends sanitized, user-friendly error messages
//! - Logs detailed internal errors for debugging via `tracing`
//! - Prevents leaking database/system information to clients
//!
//! ## Philosophy
//!
//! **Never expose internal errors to users**. Database errors and internal
//! implementation details are logged server-side but never sent to clients.
//! Seeding failures never reach an API response at all — they are caught at
//! the [`SeedRunner`](crate::seeder::SeedRunner) boundary and surface only in
//! operator logs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// Error type for resource operations and seeding.
///
/// HTTP-facing variants map to status codes in [`IntoResponse`]; the
/// seeding-side variants (`UnknownFactory`, `Configuration`) normally
/// propagate to the caller that triggered synthesis or a seed run.
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - a detail lookup matched zero rows
    NotFound {
        /// Resource identifier (e.g., "user", "post")
        resource: String,
        /// Optional ID that wasn't found
        id: Option<String>,
    },

    /// 403 Forbidden - the operation was never implemented for this resource
    ///
    /// `create` and `update` default to this so read-only resources need not
    /// explicitly disable their write paths.
    Unsupported {
        /// Resource identifier
        resource: String,
        /// Operation name ("create", "update", ...)
        operation: String,
    },

    /// A seed unit referenced an entity kind that was never registered
    UnknownFactory {
        /// Entity-kind name used for the lookup
        kind: String,
    },

    /// A CRUD descriptor named an operation outside the fixed set of five
    ///
    /// Rejected at synthesis time, not at request time.
    Configuration {
        /// What was wrong with the descriptor
        message: String,
    },

    /// 500 Internal Server Error - database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - generic internal error
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },
}

impl ApiError {
    /// Create a 404 Not Found error
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(ApiError::not_found("user", Some(id.to_string())));
    /// ```
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    /// Create a 403 error for an operation the resource never implemented
    pub fn unsupported(resource: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            resource: resource.into(),
            operation: operation.into(),
        }
    }

    /// Create an error for an unregistered factory kind
    pub fn unknown_factory(kind: impl Into<String>) -> Self {
        Self::UnknownFactory { kind: kind.into() }
    }

    /// Create a descriptor configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a 500 error from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    ///
    /// # Example
    /// ```rust,ignore
    /// let rows = query.all(db).await.map_err(ApiError::database)?;
    /// ```
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Create a 500 error with optional internal details
    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unsupported { .. } => StatusCode::FORBIDDEN,
            Self::UnknownFactory { .. }
            | Self::Configuration { .. }
            | Self::Database { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => {
                if let Some(id) = id {
                    format!("{resource} {id} not found")
                } else {
                    format!("{resource} not found")
                }
            }
            Self::Unsupported {
                resource,
                operation,
            } => format!("Can not {operation} {resource}"),
            Self::UnknownFactory { kind } => format!("No factory registered for '{kind}'"),
            Self::Configuration { message } => message.clone(),
            Self::Database { message, .. } | Self::Internal { message, .. } => message.clone(),
        }
    }

    /// Log internal error details (not sent to user)
    ///
    /// Uses the `tracing` crate - silent unless a subscriber is installed.
    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// Convert a Sea-ORM `DbErr` to an `ApiError`
///
/// `DbErr::RecordNotFound` becomes 404; every other variant becomes a 500
/// with the details logged internally and sanitized for users.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(what) => Self::NotFound {
                resource: what,
                id: None,
            },
            other => Self::database(other),
        }
    }
}
