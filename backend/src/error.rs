//! Error handling for the brasserie stock platform
//!
//! Every service operation returns `AppResult<T>`; the `IntoResponse` impl
//! maps each failure to an HTTP status and a JSON error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    // Ledger errors
    #[error("Insufficient stock for {0}")]
    InsufficientStock(String),

    #[error("Requested {requested} units but only {remaining} remain")]
    InsufficientUnits { requested: i32, remaining: i32 },

    #[error("Stock item {0} is used by a recipe")]
    ItemInUse(String),

    #[error("Lot {0} already has recorded sales")]
    LotHasSales(String),

    #[error("Invalid quantity for {field}: {message}")]
    InvalidQuantity { field: String, message: String },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::InsufficientStock(item) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message: format!("Insufficient stock for {}", item),
                    field: None,
                },
            ),
            AppError::InsufficientUnits { requested, remaining } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_UNITS".to_string(),
                    message: format!(
                        "Requested {} units but only {} remain",
                        requested, remaining
                    ),
                    field: None,
                },
            ),
            AppError::ItemInUse(item) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "ITEM_IN_USE".to_string(),
                    message: format!("Stock item {} is used by a recipe", item),
                    field: None,
                },
            ),
            AppError::LotHasSales(lot) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "LOT_HAS_SALES".to_string(),
                    message: format!("Lot {} already has recorded sales", lot),
                    field: None,
                },
            ),
            AppError::InvalidQuantity { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_QUANTITY".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message: "A database error occurred".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for services and handlers
pub type AppResult<T> = Result<T, AppError>;
