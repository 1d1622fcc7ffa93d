//! Typed error handling for crewbook
//!
//! Every fallible operation in the core returns a [`CrewError`] (or one of its
//! per-area sub-enums), so handlers can map failures to HTTP responses without
//! inspecting message strings.
//!
//! # Error Categories
//!
//! - [`EntityError`]: a referenced record does not exist
//! - [`ValidationError`]: input rejected before any write
//! - [`StorageError`]: the persistence port failed (transient or fatal)
//! - [`RequestError`]: request-level failures such as a rejected login
//! - [`ConfigError`]: configuration could not be loaded or is out of range
//!
//! # Example
//!
//! ```rust,ignore
//! use crewbook::prelude::*;
//!
//! async fn load_job(jobs: &dyn DataService<Job>, id: RecordId) -> CrewResult<Job> {
//!     jobs.get(id)
//!         .await?
//!         .ok_or_else(|| EntityError::not_found("job", id).into())
//! }
//! ```

use crate::core::entity::RecordId;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for crewbook
#[derive(Debug)]
pub enum CrewError {
    /// A referenced record was not found
    Entity(EntityError),

    /// Input rejected before any write
    Validation(ValidationError),

    /// Persistence port failure
    Storage(StorageError),

    /// Request-level failure (login)
    Request(RequestError),

    /// Configuration failure
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for CrewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrewError::Entity(e) => write!(f, "{}", e),
            CrewError::Validation(e) => write!(f, "{}", e),
            CrewError::Storage(e) => write!(f, "{}", e),
            CrewError::Request(e) => write!(f, "{}", e),
            CrewError::Config(e) => write!(f, "{}", e),
            CrewError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CrewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrewError::Entity(e) => Some(e),
            CrewError::Validation(e) => Some(e),
            CrewError::Storage(e) => Some(e),
            CrewError::Request(e) => Some(e),
            CrewError::Config(e) => Some(e),
            CrewError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CrewError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CrewError::Entity(e) => e.status_code(),
            CrewError::Validation(_) => StatusCode::BAD_REQUEST,
            CrewError::Storage(e) => e.status_code(),
            CrewError::Request(e) => e.status_code(),
            CrewError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CrewError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CrewError::Entity(e) => e.error_code(),
            CrewError::Validation(_) => "VALIDATION_ERROR",
            CrewError::Storage(e) => e.error_code(),
            CrewError::Request(e) => e.error_code(),
            CrewError::Config(_) => "CONFIG_ERROR",
            CrewError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CrewError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entityType": entity_type,
                    "id": id
                }))
            }
            CrewError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            CrewError::Validation(ValidationError::FieldError { field, message }) => {
                Some(serde_json::json!({ "fields": [{ "field": field, "message": message }] }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for CrewError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

/// Result type alias using [`CrewError`]
pub type CrewResult<T> = Result<T, CrewError>;

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to record lookups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    /// No record with this id is visible through the accessor that was used
    #[error("{entity_type} with id '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: RecordId,
    },

    /// A filtered query matched nothing
    #[error("No {entity_type} records match the given filter")]
    NoMatches { entity_type: &'static str },
}

impl EntityError {
    pub fn not_found(entity_type: &'static str, id: RecordId) -> Self {
        EntityError::NotFound { entity_type, id }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::NoMatches { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::NoMatches { .. } => "NO_MATCHING_RECORDS",
        }
    }
}

impl From<EntityError> for CrewError {
    fn from(err: EntityError) -> Self {
        CrewError::Entity(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    #[error("Validation errors: {}", join_fields(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Body could not be parsed
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_fields(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::FieldError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Flatten `validator` output into field errors, optionally prefixing
    /// every field path (used for list items such as `[2].name`).
    pub fn from_validator(errors: &validator::ValidationErrors, prefix: Option<&str>) -> Vec<FieldValidationError> {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let path = match prefix {
                    Some(p) => format!("{}.{}", p, field),
                    None => field.to_string(),
                };
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldValidationError::new(path.clone(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        fields
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ValidationError::FieldErrors(ValidationError::from_validator(&errors, None))
    }
}

impl From<ValidationError> for CrewError {
    fn from(err: ValidationError) -> Self {
        CrewError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by the persistence port
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Connectivity failure; the whole operation may be retried
    #[error("Failed to reach {backend}: {message}")]
    ConnectionError { backend: String, message: String },

    /// Query failed for a reason a retry will not fix
    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },

    /// Transaction could not be opened, committed or rolled back
    #[error("Transaction error: {message}")]
    TransactionError { message: String },

    /// A referential constraint rejected the write
    #[error("Data integrity error: {message}")]
    IntegrityError { message: String },

    /// Transient failures persisted past the retry budget
    #[error("{operation} failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        message: String,
    },
}

impl StorageError {
    /// Whether the failure is a connectivity blip worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::ConnectionError { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::IntegrityError { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::ConnectionError { .. } => "STORAGE_UNAVAILABLE",
            StorageError::QueryError { .. } => "STORAGE_ERROR",
            StorageError::TransactionError { .. } => "TRANSACTION_ERROR",
            StorageError::IntegrityError { .. } => "INTEGRITY_ERROR",
            StorageError::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
        }
    }
}

impl From<StorageError> for CrewError {
    fn from(err: StorageError) -> Self {
        CrewError::Storage(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Credentials did not match
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
        }
    }
}

impl From<RequestError> for CrewError {
    fn from(err: RequestError) -> Self {
        CrewError::Request(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", file_suffix(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

impl From<ConfigError> for CrewError {
    fn from(err: ConfigError) -> Self {
        CrewError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for CrewError {
    fn from(err: serde_json::Error) -> Self {
        CrewError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for CrewError {
    fn from(err: anyhow::Error) -> Self {
        CrewError::Internal(err.to_string())
    }
}
