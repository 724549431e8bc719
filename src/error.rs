use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub const PROMPT_REQUIRED: &str = "Prompt is required";
pub const GENERATION_FAILED: &str = "Image generation failed";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Generation(String),
}

impl ServiceError {
    pub fn missing_prompt() -> Self {
        ServiceError::Validation(PROMPT_REQUIRED.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client; failures without text get a generic one.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Validation(message) => message.clone(),
            ServiceError::Generation(message) if message.trim().is_empty() => {
                GENERATION_FAILED.to_string()
            }
            ServiceError::Generation(message) => message.clone(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Generation(err.to_string())
    }
}

impl From<MultipartError> for ServiceError {
    fn from(err: MultipartError) -> Self {
        ServiceError::Generation(err.to_string())
    }
}

impl From<MultipartRejection> for ServiceError {
    fn from(rejection: MultipartRejection) -> Self {
        ServiceError::Generation(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.public_message(),
        });

        (
            self.status(),
            [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            axum::Json(body),
        )
            .into_response()
    }
}
