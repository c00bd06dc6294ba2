mod normalize;
mod types;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub use normalize::{extract_image, find_image, RefusalSentinel};
pub use types::*;

use crate::config::Config;
use crate::core::{ImagePayload, PromptVariant, SwapError, SwapParams};
use crate::http_client::HTTP_CLIENT;

const FALLBACK_UPSTREAM_MESSAGE: &str = "Failed to process image";

/// Status and parsed JSON body of an upstream call
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound side of the swap: posts a completion request and waits for the
/// whole body.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &ChatRequest,
    ) -> Result<UpstreamReply, SwapError>;
}

/// Transport backed by reqwest
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpTransport;

#[async_trait]
impl UpstreamTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &ChatRequest,
    ) -> Result<UpstreamReply, SwapError> {
        let response = HTTP_CLIENT
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        tracing::debug!("Response status: {}", status);

        let body = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!("Upstream returned non-JSON body (status {}): {}", status, text);
                if (200..300).contains(&status) {
                    return Err(err.into());
                }
                // Keep the status; the caller falls back to a generic message
                Value::String(text)
            }
        };
        Ok(UpstreamReply { status, body })
    }
}

/// OpenRouter chat-completions client performing face swaps
#[derive(Clone)]
pub struct SwapClient {
    api_key: Option<String>,
    base_url: String,
    params: SwapParams,
    transport: Arc<dyn UpstreamTransport>,
}

impl SwapClient {
    /// Create a new client from config
    pub fn from_config(config: &Config, transport: Arc<dyn UpstreamTransport>) -> Self {
        Self {
            api_key: config.api_key().map(str::to_string),
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            params: config.swap_params(),
            transport,
        }
    }

    pub fn params(&self) -> &SwapParams {
        &self.params
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Run one swap end to end and return the generated image as a data URI.
    pub async fn swap(&self, image: Option<&str>, variant: Option<&str>) -> Result<String, SwapError> {
        let image = image
            .filter(|image| !image.is_empty())
            .ok_or(SwapError::MissingInput)?;

        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(SwapError::MisconfiguredService)?;

        let params = match variant {
            Some(name) => self.params.clone().with_variant(PromptVariant::parse(name)?),
            None => self.params.clone(),
        };

        let subject = ImagePayload::parse(image)?;
        let request = build_request(&params, &subject);

        tracing::info!(
            model = %params.model,
            variant = params.variant.as_str(),
            "Sending swap request"
        );
        tracing::debug!("Request body: {}", serde_json::to_string_pretty(&request)?);

        let reply = self
            .transport
            .post_json(&self.endpoint(), api_key, &request)
            .await?;

        if !reply.is_success() {
            tracing::error!(
                "OpenRouter Error: {}",
                serde_json::to_string_pretty(&reply.body)?
            );
            let message = serde_json::from_value::<ApiErrorResponse>(reply.body)
                .ok()
                .and_then(|parsed| parsed.error)
                .and_then(|error| error.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| FALLBACK_UPSTREAM_MESSAGE.to_string());
            return Err(SwapError::UpstreamTransport {
                status: reply.status,
                message,
            });
        }

        let choice = reply
            .body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .cloned()
            .unwrap_or(Value::Null);

        match extract_image(&choice) {
            Ok(image) => Ok(image),
            Err(SwapError::NoImageFound) => {
                tracing::error!(
                    "No image found in response. Full Choice Object: {}",
                    serde_json::to_string_pretty(&choice)?
                );
                Err(SwapError::NoImageFound)
            }
            Err(err) => {
                tracing::warn!("Generation refused: {}", err);
                Err(err)
            }
        }
    }
}

/// Build the completion request for one subject image
pub fn build_request(params: &SwapParams, subject: &ImagePayload) -> ChatRequest {
    let reference = ContentBlock::image(&params.reference_image_url);
    let subject = ContentBlock::image(subject.to_data_uri());

    let mut content = vec![ContentBlock::text(params.instruction())];
    if params.reference_first {
        content.extend([reference, subject]);
    } else {
        content.extend([subject, reference]);
    }

    ChatRequest {
        model: params.model.clone(),
        modalities: vec!["image".to_string(), "text".to_string()],
        messages: vec![Message {
            role: "user".to_string(),
            content,
        }],
        safety_settings: Some(SafetySetting::relaxed()),
    }
}
