use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moneytracker")]
#[command(author, version, about = "Expense photo storage manager")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store an image file as-is (no orientation correction)
    Store {
        /// Image file to store
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Import an image file, rotating it upright from its EXIF orientation
    Import {
        /// Image file to import
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Import a camera capture and remove the capture file afterwards
    Capture {
        /// Temporary capture file
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Load a stored image and display its dimensions
    Show {
        /// Path of the stored image
        #[arg(required = true)]
        path: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a stored image
    Delete {
        /// Path of the stored image
        #[arg(required = true)]
        path: PathBuf,
    },

    /// Delete stored images no longer referenced by any expense
    Cleanup {
        /// JSON export of every expense (array of expense records)
        #[arg(long)]
        expenses: Option<PathBuf>,

        /// Additional image paths to keep
        #[arg(long)]
        keep: Vec<PathBuf>,

        /// Allow deleting every stored image when nothing is referenced
        #[arg(long)]
        all: bool,
    },

    /// List stored images
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    InitConfig {
        /// Where to write the config (defaults to ./moneytracker.toml)
        path: Option<PathBuf>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
