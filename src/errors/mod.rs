use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use crate::handlers::schemas::EmployeeResponse;

pub const ENTRY_NOT_EXIST: &str = "entry not exist";
pub const ENTRY_ALREADY_EXISTS: &str = "entry already exists";
pub const INTERNAL_ERROR: &str = "internal error";
pub const INVALID_CREDENTIALS: &str = "Could not validate credentials";

/// Handler failures. Each renders the response envelope with an `errorMessage`.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound,
    Conflict,
    Unauthorized,
    Internal,
}

impl AppError {
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::NotFound => ENTRY_NOT_EXIST,
            AppError::Conflict => ENTRY_ALREADY_EXISTS,
            AppError::Unauthorized => INVALID_CREDENTIALS,
            AppError::Internal => INTERNAL_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::NotFound => write!(f, "Not Found: {}", ENTRY_NOT_EXIST),
            AppError::Conflict => write!(f, "Conflict: {}", ENTRY_ALREADY_EXISTS),
            AppError::Unauthorized => write!(f, "Unauthorized: {}", INVALID_CREDENTIALS),
            AppError::Internal => write!(f, "Internal Server Error: {}", INTERNAL_ERROR),
        }
    }
}

impl ResponseError for AppError {
    // Missing entries answer 400 rather than 404; existing clients depend on it.
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::NotFound | AppError::Conflict => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(EmployeeResponse::error(self.message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn renders_envelope_with_message() {
        let response = AppError::NotFound.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "errorMessage": "entry not exist" }));
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::Conflict.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
