//! Crowlands API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crowlands_core::error::DomainError;
use crowlands_generation::GenerateError;
use crowlands_payment::PaymentError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Persona catalog failed to load.
    #[error("catalog error: {0}")]
    Catalog(#[from] crowlands_persona::CatalogError),

    /// Database connection, pool, or migration error.
    #[error("database error: {0}")]
    Database(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Period limit, present on quota denials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Units left, present on quota denials (always 0 there).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
}

/// HTTP-layer error that maps domain failures onto status codes and a
/// stable JSON body.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed user identity.
    Unauthenticated(&'static str),
    /// The request body failed validation.
    Validation(String),
    /// A referenced record does not exist (or is not the caller's).
    NotFound {
        /// Machine-readable code, e.g. `persona_not_found`.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },
    /// The period quota is exhausted. Expected, not logged as an error.
    QuotaExceeded {
        /// The configured period limit.
        limit: u32,
    },
    /// An upstream generation provider failed.
    Provider(String),
    /// The payment processor failed.
    PaymentGateway(String),
    /// Storage is unreachable or corrupt.
    Infrastructure(String),
}

impl ApiError {
    /// 401 with a machine code of `unauthenticated`.
    #[must_use]
    pub fn unauthenticated(message: &'static str) -> Self {
        Self::Unauthenticated(message)
    }

    /// 400 with a machine code of `validation_error`.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// 404 for a payment session that does not exist or belongs to another
    /// user.
    #[must_use]
    pub fn session_not_found() -> Self {
        Self::NotFound {
            code: "session_not_found",
            message: "no such checkout session".into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(message) => Self::NotFound {
                code: "not_found",
                message,
            },
            DomainError::Validation(message) => Self::Validation(message),
            DomainError::Infrastructure(message) => Self::Infrastructure(message),
        }
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::PersonaNotFound(id) => Self::NotFound {
                code: "persona_not_found",
                message: format!("no persona with id {id:?}"),
            },
            GenerateError::QuotaExhausted { limit } => Self::QuotaExceeded { limit },
            GenerateError::Provider(provider) => Self::Provider(provider.to_string()),
            GenerateError::Storage(storage) => storage.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::UnknownSession => Self::session_not_found(),
            PaymentError::Gateway(gateway) => Self::PaymentGateway(gateway.to_string()),
            PaymentError::Storage(storage) => storage.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Unauthenticated(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: "unauthenticated",
                    message: message.to_owned(),
                    limit: None,
                    remaining: None,
                },
            ),
            Self::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "validation_error",
                    message,
                    limit: None,
                    remaining: None,
                },
            ),
            Self::NotFound { code, message } => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: code,
                    message,
                    limit: None,
                    remaining: None,
                },
            ),
            Self::QuotaExceeded { limit } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    error: "quota_exceeded",
                    message: format!(
                        "free tier allows {limit} generations per month; upgrade for unlimited access"
                    ),
                    limit: Some(limit),
                    remaining: Some(0),
                },
            ),
            Self::Provider(message) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: "provider_failure",
                    message: format!("generation provider failed, please retry: {message}"),
                    limit: None,
                    remaining: None,
                },
            ),
            Self::PaymentGateway(message) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: "payment_gateway_failure",
                    message: format!("payment processor failed, please retry: {message}"),
                    limit: None,
                    remaining: None,
                },
            ),
            Self::Infrastructure(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "infrastructure_error",
                    message,
                    limit: None,
                    remaining: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
