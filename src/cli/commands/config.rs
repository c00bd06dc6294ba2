use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::config::Config;
use crate::core::PromptVariant;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show all configuration values
    Show,

    /// Get a specific configuration value
    Get {
        /// Config key (e.g., api.model, swap.variant)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Config key (e.g., api.model, swap.variant)
        key: String,
        /// Value to set
        value: String,
    },

    /// Show the config file path
    Path,

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, config: &mut Config) -> Result<()> {
    match args.command {
        Some(ConfigCommand::Show) | None => show_config(config),
        Some(ConfigCommand::Get { key }) => get_config(&key, config),
        Some(ConfigCommand::Set { key, value }) => set_config(&key, &value, config),
        Some(ConfigCommand::Path) => show_path(config),
        Some(ConfigCommand::Reset { force }) => reset_config(force, config),
    }
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", "Configuration".cyan().bold());
    println!("{}", "=".repeat(50));

    let mut section = "";
    for key in Config::keys() {
        let (head, name) = key.split_once('.').unwrap_or(("", *key));
        if head != section {
            println!();
            println!("[{}]", head.yellow());
            section = head;
        }
        let value = config
            .get(key)
            .unwrap_or_else(|| "(not set)".dimmed().to_string());
        println!("  {} = {}", name.bold(), value);
    }

    println!();
    println!(
        "{}: {}",
        "Variants".dimmed(),
        PromptVariant::variants().join(", ")
    );
    Ok(())
}

fn get_config(key: &str, config: &Config) -> Result<()> {
    match config.get(key) {
        Some(value) => println!("{}", value),
        None => {
            if Config::keys().contains(&key) {
                println!("(not set)");
            } else {
                anyhow::bail!(
                    "Unknown config key: {}. Valid keys: {}",
                    key,
                    Config::keys().join(", ")
                );
            }
        }
    }
    Ok(())
}

fn set_config(key: &str, value: &str, config: &mut Config) -> Result<()> {
    config.set(key, value)?;
    config.save()?;

    let display = if key == "api.key" { "****" } else { value };
    println!("{} {} = {}", "✓".green(), key.bold(), display);
    Ok(())
}

fn show_path(config: &Config) -> Result<()> {
    println!("{}", config.config_path.display());
    Ok(())
}

fn reset_config(force: bool, config: &mut Config) -> Result<()> {
    if !force {
        anyhow::bail!("This resets every setting. Re-run with --force to confirm.");
    }

    let path = std::mem::take(&mut config.config_path);
    *config = Config {
        config_path: path,
        ..Config::default()
    };
    config.save()?;

    println!("{} Configuration reset to defaults", "✓".green());
    Ok(())
}
