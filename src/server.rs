// HTTP surface: the swap endpoint plus a health probe

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::{SwapClient, SwapRequest, SwapResponse};
use crate::core::SwapError;

/// Largest accepted swap body. Base64 inflates uploads by a third, so this
/// leaves room for photos well past axum's 2 MB default.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared handler state; read-only after construction
#[derive(Clone)]
pub struct AppState {
    pub client: SwapClient,
}

impl AppState {
    pub fn new(client: SwapClient) -> Arc<Self> {
        Arc::new(Self { client })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/swap",
            post(swap_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// The body is parsed by hand so malformed JSON and oversized uploads are
/// reported through the same `{error}` shape as every other failure.
async fn swap_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let span = tracing::info_span!("swap", request_id = %Uuid::new_v4());

    async move {
        let body = match body {
            Ok(body) => body,
            Err(rejection) => {
                tracing::warn!("Rejected request body: {}", rejection.body_text());
                return (
                    rejection.status(),
                    Json(json!({ "error": rejection.body_text() })),
                )
                    .into_response();
            }
        };

        match handle_swap(&state.client, &body).await {
            Ok(processed_image) => {
                tracing::info!("Swap completed");
                (StatusCode::OK, Json(SwapResponse { processed_image })).into_response()
            }
            Err(err) => {
                match &err {
                    SwapError::MissingInput | SwapError::InvalidInput(_) => {
                        tracing::warn!("Rejected request: {}", err)
                    }
                    _ => tracing::error!("API Route Error: {}", err),
                }
                err.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn handle_swap(client: &SwapClient, body: &[u8]) -> Result<String, SwapError> {
    let request: SwapRequest = serde_json::from_slice(body)?;
    client
        .swap(request.image.as_deref(), request.variant.as_deref())
        .await
}
