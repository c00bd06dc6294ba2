use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub const SAFETY_REFUSAL_MESSAGE: &str =
    "Image generation was blocked by safety filters. Try an image with clearer context.";

pub const RECITATION_REFUSAL_MESSAGE: &str = "The model detected this image as a copyrighted work and refused to modify it (IMAGE_RECITATION). Try a less famous cover or a different angle.";

pub const NO_IMAGE_MESSAGE: &str =
    "Model generated tokens but no image data was found in the response. Check logs.";

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("No image provided")]
    MissingInput,

    #[error("Invalid image: {0}")]
    InvalidInput(String),

    #[error("OpenRouter API Key is missing")]
    MisconfiguredService,

    #[error("{message}")]
    UpstreamTransport { status: u16, message: String },

    #[error("{}", SAFETY_REFUSAL_MESSAGE)]
    SafetyRefusal,

    #[error("{}", RECITATION_REFUSAL_MESSAGE)]
    RecitationRefusal,

    #[error("{}", NO_IMAGE_MESSAGE)]
    NoImageFound,

    #[error("{0}")]
    Unhandled(String),
}

impl SwapError {
    /// HTTP status reported to the client for this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            SwapError::MissingInput | SwapError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SwapError::UpstreamTransport { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            SwapError::SafetyRefusal | SwapError::RecitationRefusal => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SwapError::MisconfiguredService
            | SwapError::NoImageFound
            | SwapError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for SwapError {
    fn from(err: reqwest::Error) -> Self {
        SwapError::Unhandled(err.to_string())
    }
}

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        SwapError::Unhandled(err.to_string())
    }
}

impl IntoResponse for SwapError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
