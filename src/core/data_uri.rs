use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::SwapError;

const FALLBACK_MIME: &str = "image/jpeg";

/// An image carried inline as `data:<mime>;base64,<payload>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Split a data URI at its first comma.
    ///
    /// The header is only used to recover the MIME type; anything that is not
    /// an `image/*` declaration falls back to JPEG.
    pub fn parse(uri: &str) -> Result<Self, SwapError> {
        let (header, data) = uri.split_once(',').ok_or_else(|| {
            SwapError::InvalidInput("expected a data URI of the form data:<mime>;base64,<data>".into())
        })?;

        let mime_type = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .map(str::trim)
            .filter(|mime| mime.starts_with("image/"))
            .unwrap_or(FALLBACK_MIME);

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>, SwapError> {
        BASE64
            .decode(self.data.trim())
            .map_err(|e| SwapError::InvalidInput(format!("bad base64 payload: {e}")))
    }

    /// File extension matching the declared MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// Guess an image MIME type from a file extension
pub fn mime_from_extension(ext: Option<&str>) -> &'static str {
    match ext.map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}
