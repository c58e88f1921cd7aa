use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use sqlx::error::ErrorKind;
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::{clock::TimeFormatError, time_window::WindowError};

pub type AppResult<T> = Result<T, AppError>;

/// One failing field of a structurally bound request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "clock_in")]
    pub field: String,
    #[schema(example = "This field is required")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, "This field is required")
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            errors: Vec::new(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Turns a list of collected field errors into `Ok` when empty.
    pub fn check_fields(errors: Vec<FieldError>) -> AppResult<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation {
                message: "Validation failed".to_string(),
                errors,
            })
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation { message, errors } if !errors.is_empty() => json!({
                "error": true,
                "message": message,
                "errors": errors,
            }),
            // details were logged where the failure happened
            AppError::Internal(_) => json!({
                "error": true,
                "message": "Internal Server Error",
            }),
            other => json!({
                "error": true,
                "message": other.to_string(),
            }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    tracing::warn!(error = %e, "Unique constraint rejected write");
                    return AppError::conflict("Record already exists");
                }
                ErrorKind::ForeignKeyViolation => {
                    tracing::warn!(error = %e, "Foreign key rejected write");
                    return AppError::conflict("Record is still referenced by other data");
                }
                _ => {}
            }
        }

        tracing::error!(error = %e, "Database error");
        AppError::internal(e.to_string())
    }
}

impl From<TimeFormatError> for AppError {
    fn from(e: TimeFormatError) -> Self {
        AppError::Validation {
            message: "Invalid time format. Use HH:MM".to_string(),
            errors: vec![FieldError::new(e.field(), e.to_string())],
        }
    }
}

impl From<WindowError> for AppError {
    fn from(e: WindowError) -> Self {
        AppError::validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: AppError) -> serde_json::Value {
        let resp = err.error_response();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn envelope_carries_message_and_flag() {
        let body = body_json(AppError::conflict("You have already checked in today")).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "You have already checked in today");
        assert!(body.get("errors").is_none());
    }

    #[actix_web::test]
    async fn validation_lists_field_errors() {
        let err = AppError::check_fields(vec![FieldError::required("clock_out")]).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = body_json(err).await;
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"][0]["field"], "clock_out");
        assert_eq!(body["errors"][0]["message"], "This field is required");
    }

    #[actix_web::test]
    async fn internal_details_are_hidden() {
        let body = body_json(AppError::internal("connection reset by peer")).await;
        assert_eq!(body["message"], "Internal Server Error");
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::conflict("x").status_code(), StatusCode::CONFLICT);
    }
}
