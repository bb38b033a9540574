use actix_web::HttpResponse;
use thiserror::Error;

use crate::demo_control::DemoControlError;
use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// An operator action failed; `details` is shown to the caller.
    #[error("{message}: {details}")]
    Operation { message: String, details: String },
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(_) => AppError::NotFound(e.to_string()),
            DomainError::InvalidInput(_) | DomainError::StockUnavailable(_) => {
                AppError::BadRequest(e.to_string())
            }
            DomainError::Conflict(_) => AppError::Conflict(e.to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<DemoControlError> for AppError {
    fn from(e: DemoControlError) -> Self {
        match e {
            DemoControlError::InvalidRequest(msg) => AppError::BadRequest(msg),
            DemoControlError::Domain(inner) => inner.into(),
            DemoControlError::EnvFile { .. } => AppError::Operation {
                message: "Could not read or parse .env file.".into(),
                details: e.to_string(),
            },
            DemoControlError::Script(inner) => AppError::Operation {
                message: "Script execution failed.".into(),
                details: inner.to_string(),
            },
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Conflict(_) => HttpResponse::Conflict().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Internal(msg) => {
                log::error!("request failed: {msg}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
            AppError::Operation { message, details } => {
                log::error!("{message} {details}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": message,
                    "details": details
                }))
            }
        }
    }
}
