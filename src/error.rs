//! Unified error handling
//!
//! [`AppError`] covers the whole error taxonomy exposed by the API:
//!
//! | Variant | Code | Status |
//! |---------|------|--------|
//! | `Validation` | `VALIDATION_ERROR` | 400 |
//! | `InvalidItems` | `INVALID_ITEMS` | 400 |
//! | `TotalMismatch` | `TOTAL_MISMATCH` | 400 |
//! | `NotFound` | `NOT_FOUND` | 404 |
//! | `Conflict` | `CONFLICT` | 409 |
//! | `Create` | `CREATE_ERROR` | 500 |
//! | `Fetch` | `FETCH_ERROR` | 500 |
//! | `Update` | `UPDATE_ERROR` | 500 |
//! | `Delete` | `DELETE_ERROR` | 500 |
//! | `Analytics` | `ANALYTICS_ERROR` | 500 |
//! | `Internal` | `INTERNAL_ERROR` | 500 |
//!
//! Every response carries a stable machine-readable code plus a human-readable
//! message. Store-level error text is logged server-side and never echoed to
//! the client on 5xx responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// Application-level Result type used by handlers and core logic
pub type AppResult<T> = Result<T, AppError>;

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Caller errors (4xx) ==========
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown menu items: {0}")]
    InvalidItems(String),

    #[error("Order total mismatch: expected {expected}, received {received}")]
    TotalMismatch { expected: Decimal, received: Decimal },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ========== Infrastructure errors (5xx) ==========
    #[error("Create failed: {0}")]
    Create(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Update failed: {0}")]
    Update(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Analytics aggregation failed: {0}")]
    Analytics(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error payload inside the response envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidItems(_) => "INVALID_ITEMS",
            AppError::TotalMismatch { .. } => "TOTAL_MISMATCH",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Create(_) => "CREATE_ERROR",
            AppError::Fetch(_) => "FETCH_ERROR",
            AppError::Update(_) => "UPDATE_ERROR",
            AppError::Delete(_) => "DELETE_ERROR",
            AppError::Analytics(_) => "ANALYTICS_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidItems(_) | AppError::TotalMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Infrastructure errors get a generic message;
    /// the underlying cause stays in the server log.
    fn public_message(&self) -> String {
        match self {
            AppError::Create(_) => "Failed to create order".into(),
            AppError::Fetch(_) => "Failed to fetch data".into(),
            AppError::Update(_) => "Failed to update data".into(),
            AppError::Delete(_) => "Failed to delete data".into(),
            AppError::Analytics(_) => "Failed to compute analytics".into(),
            AppError::Internal(_) => "Internal server error".into(),
            other => other.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::TotalMismatch { expected, received } => Some(json!({
                "expected": expected,
                "received": received,
            })),
            _ => None,
        }
    }

    // ========== Helper constructors ==========

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn create(e: impl std::fmt::Display) -> Self {
        Self::Create(e.to_string())
    }

    pub fn fetch(e: impl std::fmt::Display) -> Self {
        Self::Fetch(e.to_string())
    }

    pub fn update(e: impl std::fmt::Display) -> Self {
        Self::Update(e.to_string())
    }

    pub fn delete(e: impl std::fmt::Display) -> Self {
        Self::Delete(e.to_string())
    }

    pub fn analytics(e: impl std::fmt::Display) -> Self {
        Self::Analytics(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        }

        let body = json!({
            "success": false,
            "error": ErrorBody {
                message: self.public_message(),
                code: self.code(),
                details: self.details(),
            },
        });

        (status, Json(body)).into_response()
    }
}
