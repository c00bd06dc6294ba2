pub mod data_uri;
pub mod error;
pub mod params;

pub use data_uri::ImagePayload;
pub use error::SwapError;
pub use params::{PromptVariant, SwapParams};
