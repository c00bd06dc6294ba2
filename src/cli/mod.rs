pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "faceswap",
    version,
    about = "Face replacement service backed by OpenRouter image models",
    long_about = r#"Face replacement service backed by OpenRouter image models

Accepts an image as a data URI, asks a multimodal model to replace the faces
in it with a fixed reference face, and returns the generated image.
Run without arguments to start the HTTP server.

SETUP:
  Set your API key via environment variable or config:
    export OPENROUTER_API_KEY=your-key-here
    faceswap config set api.key your-key-here

EXAMPLES:
  Start the server:
    faceswap
    faceswap serve --port 8080

  Swap a local file:
    faceswap swap cover.jpg
    faceswap swap portrait.png --variant portrait --output ./out

  Manage configuration:
    faceswap config show
    faceswap config set swap.variant artistic"#,
    after_help = r#"HTTP API:
  POST /api/swap   {"image": "data:image/...;base64,...", "variant": "seamless"}
  GET  /health

  Variants: seamless (default), portrait, artistic"#
)]
pub struct Cli {
    /// Path to a config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    #[command(alias = "s")]
    Serve(commands::serve::ServeArgs),

    /// Swap faces in a local image file
    ///
    /// Runs the same pipeline as the HTTP endpoint and writes the result to disk.
    #[command(
        alias = "x",
        after_help = r#"EXAMPLES:
  Default variant:
    faceswap swap album.jpg

  Keep a painted look:
    faceswap swap painting.png --variant artistic

  JSON output:
    faceswap swap photo.jpg --format json"#
    )]
    Swap(commands::swap::SwapArgs),

    /// View or modify configuration
    #[command(
        alias = "c",
        after_help = r#"AVAILABLE SETTINGS:
  api.key                  - OpenRouter API key
  api.model                - Model identifier
  api.base_url             - OpenRouter API base URL
  swap.reference_image_url - Reference face (URL or data URI)
  swap.reference_first     - Send the reference before the subject (true/false)
  swap.variant             - Default prompt variant
  server.host              - Bind address
  server.port              - Bind port"#
    )]
    Config(commands::config::ConfigArgs),
}
