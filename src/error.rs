//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` returned by every
//! request handler. Each variant maps to one HTTP status and is rendered as a
//! JSON body of the form `{"error": "<message>"}`.
//!
//! `From` implementations cover `validator::ValidationErrors`, the credential
//! gate's `GateError`, the task store's `StoreError` and actix's
//! `BlockingError`, so handlers can use `?`.

use actix_web::{error::BlockingError, error::ResponseError, HttpResponse};
use log::error;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::GateError;
use crate::store::StoreError;

/// Represents all possible errors that can occur while serving a request.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid credentials (HTTP 401).
    Unauthorized(String),
    /// Malformed request: bad JSON or a non-numeric ID (HTTP 400).
    BadRequest(String),
    /// The requested task does not exist (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// A well-formed body failed field validation, e.g. a blank title (HTTP 400).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::BadRequest(msg) | AppError::ValidationError(msg) => {
                HttpResponse::BadRequest().json(json!({
                    "error": msg
                }))
            }
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::InternalServerError(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
        }
    }
}

/// Reports the first field message, e.g. `Title is required`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        let message = error
            .field_errors()
            .into_values()
            .flat_map(|errors| errors.iter())
            .find_map(|err| err.message.as_ref().map(|msg| msg.to_string()))
            .unwrap_or_else(|| error.to_string());
        AppError::ValidationError(message)
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        error!("Task creation failed: {}", error);
        AppError::InternalServerError("Failed to create task".into())
    }
}

/// Token issuance failures are logged in full; the client only learns which
/// step failed.
impl From<GateError> for AppError {
    fn from(error: GateError) -> AppError {
        error!("Token issuance failed: {}", error);
        match error {
            GateError::Entropy(_) => AppError::InternalServerError("Failed to generate token".into()),
            GateError::Storage(_) => AppError::InternalServerError("Failed to save token".into()),
        }
    }
}

/// The blocking thread pool went away or the closure panicked.
impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
