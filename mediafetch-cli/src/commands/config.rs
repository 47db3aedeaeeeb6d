//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path`
//! for viewing and modifying settings from the command line. Every command
//! honours the global `--config` override.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use mediafetch::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;
use crate::runner::load_config;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., downloads.format)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., downloads.format)
        key: String,

        /// Value to set (empty clears optional settings)
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key, config_path),
        ConfigCommands::Set { key, value } => run_set(&key, &value, config_path),
        ConfigCommands::List => run_list(config_path),
        ConfigCommands::Path => run_path(config_path),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'mediafetch config list' to see available keys.",
            key
        ))
    })
}

fn resolve_path(config_path: Option<&Path>) -> Result<PathBuf, CliError> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(config_file_path()?),
    }
}

/// Get a configuration value.
fn run_get(key: &str, config_path: Option<&Path>) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = load_config(config_path)?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }

    Ok(())
}

/// Set a configuration value.
fn run_set(key: &str, value: &str, config_path: Option<&Path>) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let path = resolve_path(config_path)?;

    let mut config = load_config(Some(&path))?;
    config_key.set(&mut config, value)?;
    config.save_to(&path)?;

    println!("Set {} = {}", config_key.name(), config_key.get(&config));

    Ok(())
}

/// List all configuration settings.
fn run_list(config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;

    println!("Configuration Settings");
    println!("======================");
    println!();
    print!("{}", render_settings(&config));

    Ok(())
}

/// Render every key grouped by section.
pub fn render_settings(config: &ConfigFile) -> String {
    let mut out = String::new();
    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            if !current_section.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section));
            current_section = section;
        }

        let value = key.get(config);
        if value.is_empty() {
            out.push_str(&format!("  {} = (not set)\n", key.key_name()));
        } else {
            out.push_str(&format!("  {} = {}\n", key.key_name(), value));
        }
    }

    out
}

/// Show the configuration file path.
fn run_path(config_path: Option<&Path>) -> Result<(), CliError> {
    println!("{}", resolve_path(config_path)?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = parse_key("downloads.nope").unwrap_err();
        assert!(err.to_string().contains("downloads.nope"));
    }

    #[test]
    fn test_set_writes_override_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        run_set("downloads.format", "137", Some(&path)).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.downloads.format.as_deref(), Some("137"));
    }

    #[test]
    fn test_set_rejects_invalid_value() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");

        assert!(run_set("downloads.output_template", "", Some(&path)).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_render_settings_groups_sections() {
        let rendered = render_settings(&ConfigFile::default());
        assert!(rendered.starts_with("[executable]\n"));
        assert!(rendered.contains("\n[downloads]\n"));
        assert!(rendered.contains("\n[logging]\n"));
        assert!(rendered.contains("(not set)"));
    }

    #[test]
    fn test_path_override_is_used() {
        let path = PathBuf::from("/tmp/custom.ini");
        assert_eq!(resolve_path(Some(&path)).unwrap(), path);
    }
}
