use serde::{Deserialize, Serialize};

use super::SwapError;

/// Instruction style sent alongside the images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    /// Swap every face, matching grain, lighting and medium exactly
    #[default]
    Seamless,
    /// Single main subject, photorealistic result
    Portrait,
    /// Keep a painted or illustrated medium intact
    Artistic,
}

impl PromptVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptVariant::Seamless => "seamless",
            PromptVariant::Portrait => "portrait",
            PromptVariant::Artistic => "artistic",
        }
    }

    pub fn parse(s: &str) -> Result<Self, SwapError> {
        match s.trim().to_lowercase().as_str() {
            "seamless" => Ok(PromptVariant::Seamless),
            "portrait" => Ok(PromptVariant::Portrait),
            "artistic" => Ok(PromptVariant::Artistic),
            other => Err(SwapError::InvalidInput(format!(
                "unknown variant '{}'. Valid values: {}",
                other,
                Self::variants().join(", ")
            ))),
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["seamless", "portrait", "artistic"]
    }

    /// Full instruction text. Images are referred to by position, so the
    /// wording depends on whether the reference comes first.
    pub fn instruction(&self, reference_first: bool) -> String {
        let (reference, target) = if reference_first {
            ("Image 1", "Image 2")
        } else {
            ("Image 2", "Image 1")
        };

        match self {
            PromptVariant::Seamless => format!(
                "SEAMLESS ARTISTIC FACE SWAP: {reference} is the reference face. {target} is a foundational composition. \
                 Perform an EXHAUSTIVE face swap for EVERY person. CRITICAL: The integration must be SEAMLESS. \
                 You MUST match the exact lighting, contrast, film grain, analog noise, and artistic medium of {target}. \
                 If {target} is black and white, the new faces must be perfectly monochromatic with matching depth. \
                 If it is grainy, the new faces must have identical grain density. \
                 The faces should feel like they were captured by the same camera at the same moment. \
                 DO NOT change head shapes, hair, or surroundings. Output ONLY the modified {target}."
            ),
            PromptVariant::Portrait => format!(
                "PHOTOREALISTIC FACE REPLACEMENT: {reference} is the reference face. {target} is the target photo. \
                 Replace the face identity of the main subject in {target} with the reference face. \
                 Keep the pose, expression direction, skin tone transitions, lighting, and camera characteristics of {target}. \
                 DO NOT change hair, clothing, background, or framing. Output ONLY the modified {target}."
            ),
            PromptVariant::Artistic => format!(
                "STYLE-MATCHED FACE SWAP: {reference} is the reference face. {target} is an artwork. \
                 Replace every face in {target} with the reference identity, rendered in the SAME artistic medium: \
                 brush strokes, line work, palette, texture, and shading must be indistinguishable from the rest of {target}. \
                 Never paste a photographic face into a painting or illustration. \
                 DO NOT change hair, composition, or surroundings. Output ONLY the modified {target}."
            ),
        }
    }
}

/// Parameters controlling how a swap request is built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapParams {
    /// Upstream model identifier
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub variant: PromptVariant,

    /// Put the reference image before the subject image
    #[serde(default = "default_reference_first")]
    pub reference_first: bool,

    /// Reference subject image (remote URL or data URI)
    pub reference_image_url: String,
}

pub(crate) fn default_model() -> String {
    "google/gemini-2.5-flash-image".to_string()
}

fn default_reference_first() -> bool {
    true
}

impl SwapParams {
    pub fn new(reference_image_url: impl Into<String>) -> Self {
        Self {
            model: default_model(),
            variant: PromptVariant::default(),
            reference_first: true,
            reference_image_url: reference_image_url.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_variant(mut self, variant: PromptVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_reference_first(mut self, reference_first: bool) -> Self {
        self.reference_first = reference_first;
        self
    }

    pub fn instruction(&self) -> String {
        self.variant.instruction(self.reference_first)
    }
}
