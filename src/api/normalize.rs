//! Locating the generated image inside a completion choice.
//!
//! Providers behind the router put images in different places: a bare data
//! URI as message content, a data URI buried in prose, an `image_url` block,
//! or some object with a `url` field. The search below walks the message
//! depth-first and takes the first hit.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::core::SwapError;

const DATA_IMAGE_PREFIX: &str = "data:image";

static EMBEDDED_DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"data:image/[a-z]+;base64,[a-zA-Z0-9+/=]+").expect("valid data URI pattern")
});

/// Finish reasons meaning the model refused instead of answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalSentinel {
    Safety,
    Recitation,
}

impl RefusalSentinel {
    pub fn from_choice(choice: &Value) -> Option<Self> {
        match choice.get("native_finish_reason").and_then(Value::as_str) {
            Some("IMAGE_SAFETY") => Some(RefusalSentinel::Safety),
            Some("IMAGE_RECITATION") => Some(RefusalSentinel::Recitation),
            _ => None,
        }
    }

    pub fn into_error(self) -> SwapError {
        match self {
            RefusalSentinel::Safety => SwapError::SafetyRefusal,
            RefusalSentinel::Recitation => SwapError::RecitationRefusal,
        }
    }
}

/// Extract the image data URI from a single choice.
///
/// Refusal sentinels are checked before any searching.
pub fn extract_image(choice: &Value) -> Result<String, SwapError> {
    if let Some(sentinel) = RefusalSentinel::from_choice(choice) {
        return Err(sentinel.into_error());
    }

    choice
        .get("message")
        .and_then(find_image)
        .ok_or(SwapError::NoImageFound)
}

/// Depth-first search for an image; first match wins.
pub fn find_image(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => find_in_str(s),
        Value::Array(items) => items.iter().find_map(find_image),
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("image_url") {
                if let Some(url) = map
                    .get("image_url")
                    .and_then(|block| block.get("url"))
                    .and_then(Value::as_str)
                    .filter(|url| !url.is_empty())
                {
                    return Some(url.to_string());
                }
            }

            if let Some(url) = map
                .get("url")
                .and_then(Value::as_str)
                .filter(|url| url.starts_with(DATA_IMAGE_PREFIX))
            {
                return Some(url.to_string());
            }

            map.values().find_map(find_image)
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
    }
}

fn find_in_str(s: &str) -> Option<String> {
    if s.starts_with(DATA_IMAGE_PREFIX) {
        return Some(s.to_string());
    }
    EMBEDDED_DATA_URI
        .find(s)
        .map(|found| found.as_str().to_string())
}
