use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("The given data was invalid.")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthenticated.")]
    Unauthorized,

    #[error("This action is unauthorized.")]
    Forbidden,

    #[error("{0} not found.")]
    NotFound(&'static str),

    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(errors) => json!({
                "message": self.to_string(),
                "errors": errors,
            }),
            ApiError::Storage(e) | ApiError::Internal(e) => {
                // Details stay in the log; clients get a generic message.
                error!("{}: {:#}", status, e);
                json!({ "message": "Server Error" })
            }
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
