mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./moneytracker.toml",
        "~/.config/moneytracker/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Write `config` to a TOML file, creating parent directories as needed
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    validate_config(config)?;

    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.images.max_dimension == 0 {
        anyhow::bail!("images.max_dimension cannot be 0");
    }

    if !(1..=100).contains(&config.images.jpeg_quality) {
        anyhow::bail!(
            "images.jpeg_quality must be between 1 and 100, got {}",
            config.images.jpeg_quality
        );
    }

    if config.storage.dir.as_os_str().is_empty() {
        anyhow::bail!("storage.dir cannot be empty");
    }

    Ok(())
}
