use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;

use crate::api::{HttpTransport, SwapClient};
use crate::config::Config;
use crate::core::data_uri::mime_from_extension;
use crate::core::ImagePayload;

#[derive(Args)]
pub struct SwapArgs {
    /// Path to the image to transform
    #[arg(required = true)]
    pub image: PathBuf,

    /// Prompt variant (seamless, portrait, artistic)
    #[arg(short, long)]
    pub variant: Option<String>,

    /// Output directory for the generated image
    #[arg(short, long, default_value = "./faceswap-output")]
    pub output: PathBuf,

    /// Output format (text, json, quiet)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub async fn run(args: SwapArgs, config: &Config) -> Result<()> {
    let image_path = args.image.canonicalize().context("Image file not found")?;
    let source = load_image_data_uri(&image_path)
        .await
        .context("Failed to load image file")?;

    let client = SwapClient::from_config(config, Arc::new(HttpTransport));

    let pb = if args.format == "text" {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.yellow} {msg}")
                .context("Invalid spinner template")?,
        );
        pb.set_message(format!("Swapping faces in {}...", image_path.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = client
        .swap(Some(&source), args.variant.as_deref())
        .await;

    let processed = match result {
        Ok(processed) => processed,
        Err(e) => {
            if let Some(pb) = pb {
                pb.finish_with_message(format!("{} Swap failed", "✗".red()));
            }
            if args.format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "error": e.to_string(),
                        "status": e.status_code().as_u16(),
                    }))?
                );
            } else if args.format != "quiet" {
                eprintln!("{}: {}", "Error".red().bold(), e);
            }
            return Err(e.into());
        }
    };

    let path = save_data_uri(&processed, &args.output).await?;

    if let Some(pb) = &pb {
        pb.finish_with_message(format!("{} Swapped image saved", "✓".green()));
    }

    match args.format.as_str() {
        "json" => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "source": image_path,
                    "output": path,
                    "model": client.params().model,
                    "variant": args.variant.as_deref().unwrap_or(client.params().variant.as_str()),
                }))?
            );
        }
        "quiet" => println!("{}", path.display()),
        _ => {
            println!();
            println!("{}: {}", "Source".cyan().bold(), image_path.display());
            println!("{}: {}", "Model".cyan().bold(), client.params().model);
            println!("{}: {}", "Output".cyan().bold(), path.display());
        }
    }

    Ok(())
}

/// Read an image file and encode it as a data URI
pub async fn load_image_data_uri(path: &Path) -> Result<String> {
    let data = fs::read(path).await?;
    let mime_type = mime_from_extension(path.extension().and_then(|e| e.to_str()));
    Ok(ImagePayload::from_bytes(&data, mime_type).to_data_uri())
}

/// Decode a data URI and write it under `output_dir`
pub async fn save_data_uri(uri: &str, output_dir: &Path) -> Result<PathBuf> {
    if !uri.starts_with("data:") {
        anyhow::bail!(
            "Model returned a remote image URL instead of inline image data: {}",
            uri
        );
    }

    fs::create_dir_all(output_dir).await?;

    let payload = ImagePayload::parse(uri)?;
    let bytes = payload.decode().context("Failed to decode base64 image")?;

    let filename = format!(
        "faceswap_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S_%3f"),
        payload.extension()
    );
    let path = output_dir.join(filename);
    fs::write(&path, &bytes).await?;

    tracing::info!("Saved image to: {}", path.display());
    Ok(path)
}
