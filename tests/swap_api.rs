// tests/swap_api.rs

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use faceswap::api::{ChatRequest, HttpTransport, SwapClient, UpstreamReply, UpstreamTransport};
use faceswap::config::Config;
use faceswap::core::SwapError;
use faceswap::server::{router, AppState, MAX_UPLOAD_BYTES};

/// Transport that returns a canned reply and records what it was sent
struct StubTransport {
    reply: UpstreamReply,
    calls: AtomicUsize,
    last: Mutex<Option<(String, String, Value)>>,
}

impl StubTransport {
    fn new(status: u16, body: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: UpstreamReply { status, body },
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamTransport for StubTransport {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &ChatRequest,
    ) -> Result<UpstreamReply, SwapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = serde_json::to_value(body)?;
        if let Ok(mut last) = self.last.lock() {
            *last = Some((url.to_string(), api_key.to_string(), body));
        }
        Ok(self.reply.clone())
    }
}

fn config_with_key(key: Option<&str>) -> Config {
    let mut config = Config::default();
    config.api.key = key.map(str::to_string);
    config.swap.reference_image_url = "https://example.com/ref.jpg".to_string();
    config
}

fn app(config: &Config, transport: Arc<StubTransport>) -> axum::Router {
    router(AppState::new(SwapClient::from_config(config, transport)))
}

async fn post(app: axum::Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/swap")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn success_body(content: Value) -> Value {
    json!({"choices": [{"finish_reason": "stop", "message": {"role": "assistant", "content": content}}]})
}

#[tokio::test]
async fn empty_image_is_rejected_without_upstream_call() {
    let stub = StubTransport::new(200, success_body(json!("data:image/png;base64,AAA=")));
    let app = app(&config_with_key(Some("sk-test")), stub.clone());

    let (status, body) = post(app.clone(), r#"{"image": ""}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No image provided"}));

    let (status, _) = post(app, "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn missing_key_fails_before_upstream_call() {
    let stub = StubTransport::new(200, success_body(json!("data:image/png;base64,AAA=")));
    let app = app(&config_with_key(None), stub.clone());

    let (status, body) = post(app, r#"{"image": "data:image/png;base64,QUJD"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "OpenRouter API Key is missing"}));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn successful_swap_returns_processed_image() {
    let stub = StubTransport::new(
        200,
        success_body(json!([
            {"type": "text", "text": "ok"},
            {"type": "image_url", "image_url": {"url": "data:image/png;base64,BBB="}}
        ])),
    );
    let app = app(&config_with_key(Some("sk-test")), stub.clone());

    let (status, body) = post(app, r#"{"image": "data:image/png;base64,QUJD"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"processedImage": "data:image/png;base64,BBB="}));
    assert_eq!(stub.calls(), 1);

    let last = stub.last.lock().unwrap().clone();
    let (url, key, sent) = last.expect("request recorded");
    assert_eq!(url, "https://openrouter.ai/api/v1/chat/completions");
    assert_eq!(key, "sk-test");
    assert_eq!(sent["messages"][0]["content"][1]["image_url"]["url"], "https://example.com/ref.jpg");
    assert_eq!(
        sent["messages"][0]["content"][2]["image_url"]["url"],
        "data:image/png;base64,QUJD"
    );
}

#[tokio::test]
async fn upstream_error_message_is_passed_through() {
    let stub = StubTransport::new(402, json!({"error": {"code": 402, "message": "Insufficient credits"}}));
    let app = app(&config_with_key(Some("sk-test")), stub);

    let (status, body) = post(app, r#"{"image": "data:image/png;base64,QUJD"}"#).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body, json!({"error": "Insufficient credits"}));
}

#[tokio::test]
async fn upstream_error_without_message_uses_fallback() {
    let stub = StubTransport::new(503, json!({"detail": "down"}));
    let app = app(&config_with_key(Some("sk-test")), stub);

    let (status, body) = post(app, r#"{"image": "data:image/png;base64,QUJD"}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "Failed to process image"}));
}

#[tokio::test]
async fn safety_refusal_maps_to_422() {
    let stub = StubTransport::new(
        200,
        json!({"choices": [{
            "native_finish_reason": "IMAGE_SAFETY",
            "message": {"content": "data:image/png;base64,CCC="}
        }]}),
    );
    let app = app(&config_with_key(Some("sk-test")), stub);

    let (status, body) = post(app, r#"{"image": "data:image/png;base64,QUJD"}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("safety filters"));
}

#[tokio::test]
async fn missing_image_in_choice_is_500_without_debug_payload() {
    let stub = StubTransport::new(200, success_body(json!({})));
    let app = app(&config_with_key(Some("sk-test")), stub);

    let (status, body) = post(app, r#"{"image": "data:image/png;base64,QUJD"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Model generated tokens but no image data was found in the response. Check logs."})
    );
}

#[tokio::test]
async fn malformed_body_is_500_with_message() {
    let stub = StubTransport::new(200, success_body(json!("data:image/png;base64,AAA=")));
    let app = app(&config_with_key(Some("sk-test")), stub.clone());

    let (status, body) = post(app, "not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn unknown_variant_is_rejected() {
    let stub = StubTransport::new(200, success_body(json!("data:image/png;base64,AAA=")));
    let app = app(&config_with_key(Some("sk-test")), stub.clone());

    let (status, _) = post(
        app,
        r#"{"image": "data:image/png;base64,QUJD", "variant": "cubist"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn health_reports_ok() {
    let stub = StubTransport::new(200, Value::Null);
    let response = app(&config_with_key(None), stub)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

fn image_body_of_len(len: usize) -> String {
    format!(
        r#"{{"image": "data:image/jpeg;base64,{}"}}"#,
        "A".repeat(len)
    )
}

#[tokio::test]
async fn uploads_past_two_megabytes_are_accepted() {
    let stub = StubTransport::new(200, success_body(json!("data:image/png;base64,AAA=")));
    let app = app(&config_with_key(Some("sk-test")), stub.clone());

    let (status, body) = post(app, &image_body_of_len(3 * 1024 * 1024)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"processedImage": "data:image/png;base64,AAA="}));
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn oversized_upload_is_rejected_as_json() {
    let stub = StubTransport::new(200, success_body(json!("data:image/png;base64,AAA=")));
    let app = app(&config_with_key(Some("sk-test")), stub.clone());

    let (status, body) = post(app, &image_body_of_len(MAX_UPLOAD_BYTES + 1)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
    assert_eq!(stub.calls(), 0);
}

/// Serve a fixed HTML error page the way a failing gateway would
async fn spawn_html_gateway(status: StatusCode) -> std::net::SocketAddr {
    use axum::response::Html;
    use axum::routing::post;

    let upstream = axum::Router::new().route(
        "/chat/completions",
        post(move || async move {
            (
                status,
                Html("<html><body><h1>502 Bad Gateway</h1></body></html>"),
            )
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream).await;
    });
    addr
}

#[tokio::test]
async fn html_error_page_keeps_upstream_status() {
    let addr = spawn_html_gateway(StatusCode::BAD_GATEWAY).await;

    let mut config = config_with_key(Some("sk-test"));
    config.api.base_url = format!("http://{}", addr);
    let client = SwapClient::from_config(&config, Arc::new(HttpTransport));

    let err = client
        .swap(Some("data:image/png;base64,QUJD"), None)
        .await
        .unwrap_err();
    match err {
        SwapError::UpstreamTransport { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Failed to process image");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let app = router(AppState::new(client));
    let (status, body) = post(app, r#"{"image": "data:image/png;base64,QUJD"}"#).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Failed to process image"}));
}

#[tokio::test]
async fn html_body_on_success_status_is_unhandled() {
    let addr = spawn_html_gateway(StatusCode::OK).await;

    let mut config = config_with_key(Some("sk-test"));
    config.api.base_url = format!("http://{}", addr);
    let app = router(AppState::new(SwapClient::from_config(
        &config,
        Arc::new(HttpTransport),
    )));

    let (status, body) = post(app, r#"{"image": "data:image/png;base64,QUJD"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}
