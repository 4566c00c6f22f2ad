mod cli;

use moneytracker::config;
use moneytracker::images::{self, ImageCodec, ImageManager, ImageRsCodec, StoredImage};
use moneytracker_common::{valid_image_paths, Expense};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "moneytracker=debug,moneytracker_common=debug".to_string()
        } else {
            "moneytracker=warn".to_string()
        }
    });

    // Logs go to stderr so command output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Store { file } => store_file(&open_manager(config_path)?, &file),
        Commands::Import { file } => {
            let manager = open_manager(config_path)?;
            report_stored(manager.import_from_source(file.as_path()), &file)
        }
        Commands::Capture { file } => {
            let manager = open_manager(config_path)?;
            report_stored(manager.import_capture(&file), &file)
        }
        Commands::Show { path, json } => show_image(&open_manager(config_path)?, &path, json),
        Commands::Delete { path } => {
            let manager = open_manager(config_path)?;
            if !manager.delete(&path) {
                anyhow::bail!("No image deleted at {:?}", path);
            }
            println!("Deleted {}", path.display());
            Ok(())
        }
        Commands::Cleanup {
            expenses,
            keep,
            all,
        } => cleanup(
            &open_manager(config_path)?,
            expenses.as_deref(),
            &keep,
            all,
        ),
        Commands::List { json } => list_images(&open_manager(config_path)?, json),
        Commands::InitConfig { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from("moneytracker.toml"));
            if path.exists() {
                anyhow::bail!("Config file already exists: {:?}", path);
            }
            config::save_config(&path, &config::Config::default())?;
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("moneytracker {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_manager(config_path: Option<&Path>) -> Result<ImageManager> {
    let config = config::load_config_or_default(config_path)?;
    let dir = config.storage.expanded_dir();
    tracing::debug!("Using image directory {:?}", dir);
    images::open_manager(&config)
        .with_context(|| format!("Failed to open image directory: {:?}", dir))
}

fn store_file(manager: &ImageManager, file: &Path) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read image file: {:?}", file))?;
    let image = ImageRsCodec::new()
        .decode(&bytes)
        .with_context(|| format!("Failed to decode image file: {:?}", file))?;

    report_stored(manager.store(&image), file)
}

fn report_stored(stored: Option<StoredImage>, source: &Path) -> Result<()> {
    match stored {
        Some(stored) => {
            println!("{}", stored.path.display());
            tracing::info!(
                "Stored {:?} as {:?} ({}x{})",
                source,
                stored.path,
                stored.width,
                stored.height
            );
            Ok(())
        }
        None => anyhow::bail!("Failed to store image from {:?}", source),
    }
}

fn show_image(manager: &ImageManager, path: &Path, json: bool) -> Result<()> {
    let Some(image) = manager.retrieve(path) else {
        anyhow::bail!("No readable image at {:?}", path);
    };

    if json {
        let value = serde_json::json!({
            "path": path,
            "width": image.width(),
            "height": image.height(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("File: {}", path.display());
        println!("Size: {}x{}", image.width(), image.height());
    }

    Ok(())
}

fn cleanup(
    manager: &ImageManager,
    expenses_path: Option<&Path>,
    keep: &[PathBuf],
    all: bool,
) -> Result<()> {
    let mut valid: HashSet<PathBuf> = HashSet::new();

    if let Some(path) = expenses_path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read expenses file: {:?}", path))?;
        let expenses: Vec<Expense> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse expenses file: {:?}", path))?;
        tracing::debug!("Loaded {} expenses from {:?}", expenses.len(), path);
        valid.extend(valid_image_paths(&expenses));
    }
    valid.extend(keep.iter().cloned());

    if expenses_path.is_none() && keep.is_empty() && !all {
        anyhow::bail!(
            "Refusing to delete every stored image; pass --expenses, --keep or --all"
        );
    }

    // Stored paths are canonical; match user-supplied ones the same way
    let valid: HashSet<PathBuf> = valid
        .into_iter()
        .map(|p| p.canonicalize().unwrap_or(p))
        .collect();

    let deleted = manager.cleanup_orphans(&valid);
    println!("Deleted {} orphan images", deleted);
    Ok(())
}

fn list_images(manager: &ImageManager, json: bool) -> Result<()> {
    let inventory = manager.inventory();

    if json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
        return Ok(());
    }

    for entry in &inventory.images {
        let created = entry
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}  {}  {}", created, entry.size_bytes, entry.path.display());
    }
    println!(
        "\n{} images, {} bytes in {}",
        inventory.count(),
        inventory.total_bytes,
        manager.storage_dir().display()
    );

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Storage: {}", config.storage.expanded_dir().display());
            println!("  Max dimension: {}", config.images.max_dimension);
            println!("  JPEG quality: {}", config.images.jpeg_quality);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Storage: {}", config.storage.expanded_dir().display());
            println!("  Max dimension: {}", config.images.max_dimension);
            println!("  JPEG quality: {}", config.images.jpeg_quality);
        }
    }

    Ok(())
}
