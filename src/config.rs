use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{PromptVariant, SwapParams};

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub swap: SwapConfig,
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(skip)]
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    #[serde(default = "default_reference_image_url")]
    pub reference_image_url: String,
    #[serde(default = "default_true")]
    pub reference_first: bool,
    #[serde(default)]
    pub variant: PromptVariant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_model() -> String {
    crate::core::params::default_model()
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_reference_image_url() -> String {
    "https://upload.wikimedia.org/wikipedia/commons/1/10/Charlie_Kirk_%2853952923573%29_%28headshot_cropped%29.jpg".to_string()
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            reference_image_url: default_reference_image_url(),
            reference_first: true,
            variant: PromptVariant::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "faceswap", "faceswap")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from `path` (or the default location). A missing file
    /// yields defaults; nothing is written until `save` is called.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            toml::from_str::<Config>(&content).context("Failed to parse config file")?
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            Config::default()
        };
        config.config_path = config_path;

        // Environment variable takes precedence
        if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty()) {
            config.api.key = Some(key);
        }

        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get API key (from config or environment)
    pub fn api_key(&self) -> Option<&str> {
        self.api.key.as_deref()
    }

    /// Request-building parameters derived from this config
    pub fn swap_params(&self) -> SwapParams {
        SwapParams::new(&self.swap.reference_image_url)
            .with_model(&self.api.model)
            .with_variant(self.swap.variant)
            .with_reference_first(self.swap.reference_first)
    }

    /// Set a config value by key path (e.g., "api.key", "swap.variant")
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.key" => self.api.key = Some(value.to_string()),
            "api.model" => self.api.model = value.to_string(),
            "api.base_url" => self.api.base_url = value.to_string(),
            "swap.reference_image_url" => self.swap.reference_image_url = value.to_string(),
            "swap.reference_first" => {
                self.swap.reference_first = value.parse().context("Invalid boolean value")?;
            }
            "swap.variant" => {
                self.swap.variant = PromptVariant::parse(value)?;
            }
            "server.host" => self.server.host = value.to_string(),
            "server.port" => {
                self.server.port = value.parse().context("Invalid port")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Get a config value by key path
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api.key" => self.api.key.clone().map(|_| "****".to_string()), // Mask API key
            "api.model" => Some(self.api.model.clone()),
            "api.base_url" => Some(self.api.base_url.clone()),
            "swap.reference_image_url" => Some(self.swap.reference_image_url.clone()),
            "swap.reference_first" => Some(self.swap.reference_first.to_string()),
            "swap.variant" => Some(self.swap.variant.as_str().to_string()),
            "server.host" => Some(self.server.host.clone()),
            "server.port" => Some(self.server.port.to_string()),
            _ => None,
        }
    }

    /// Get all config keys
    pub fn keys() -> &'static [&'static str] {
        &[
            "api.key",
            "api.model",
            "api.base_url",
            "swap.reference_image_url",
            "swap.reference_first",
            "swap.variant",
            "server.host",
            "server.port",
        ]
    }
}
