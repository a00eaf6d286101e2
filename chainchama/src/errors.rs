use crate::chama::{ChamaError, LedgerError};
use crate::db::errors::DbError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{message}")]
    NotFound { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Savings ledger rule violation
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always `false`
    pub success: bool,
    /// Human readable, user-safe error message
    pub error: String,
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Ledger(ledger_err) => match ledger_err {
                LedgerError::GroupArchived | LedgerError::AlreadyArchived | LedgerError::AlreadyContributed { .. } => StatusCode::CONFLICT,
                LedgerError::NotAMember { .. } | LedgerError::NotCreator => StatusCode::FORBIDDEN,
                LedgerError::NonPositiveAmount
                | LedgerError::AmountMismatch { .. }
                | LedgerError::AmountOutOfRange
                | LedgerError::InvalidSavingsRatio(_)
                | LedgerError::NothingToWithdraw => StatusCode::BAD_REQUEST,
            },
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } | Error::NotFound { message } => message.clone(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Ledger(ledger_err) => ledger_err.to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { constraint, .. } => match constraint.as_deref() {
                    Some("users_email_unique") => "A user with this email address already exists".to_string(),
                    Some("members_organization_wallet_unique") => "This wallet is already a member of the organization".to_string(),
                    Some("contributions_once_per_round") => "Member already contributed in this round".to_string(),
                    Some("accounts_provider_account_unique") => "This account is already linked".to_string(),
                    _ => "Resource already exists".to_string(),
                },
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::Ledger(_) => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = ErrorEnvelope {
            success: false,
            error: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<ChamaError> for Error {
    fn from(err: ChamaError) -> Self {
        match err {
            ChamaError::Rule(rule) => Error::Ledger(rule),
            ChamaError::Database(db) => Error::Database(db),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
