//! # Pocketcode - A Pocket Code Editor Shell
//!
//! Multi-file editing sessions with unsaved-change tracking and touch
//! selection handles, driven from the terminal.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start with an empty untitled file
//! cargo run
//!
//! # Open files
//! cargo run -- src/main.rs README.md
//!
//! # Keep session mirrors in memory only
//! cargo run -- --memory
//! ```

mod shell;
mod terminal;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pocketcode_core::{Config, FsMirrorStore, MemoryMirrorStore, MirrorStore};
use pocketcode_touch::{Clipboard, MemoryClipboard, SystemClipboard};
use shell::Shell;
use terminal::shared_input;

/// Pocketcode - multi-file editing sessions with touch selection handles
#[derive(Parser, Debug)]
#[command(name = "pocketcode")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to open
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Config file to use instead of the default one
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Keep session mirrors in memory instead of the cache directory
    #[arg(long)]
    memory: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never mix with command output
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Pocketcode v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Could not load config {}", path.display()))?,
        None => Config::load(),
    };

    let store: Arc<dyn MirrorStore> = if args.memory {
        Arc::new(MemoryMirrorStore::new())
    } else {
        let dir = config.session.mirror_dir()?;
        tracing::info!("Mirroring sessions under {}", dir.display());
        Arc::new(FsMirrorStore::new(dir))
    };

    let clipboard: Box<dyn Clipboard> = if SystemClipboard::available() {
        Box::new(SystemClipboard)
    } else {
        tracing::info!("No system clipboard, using an in-process one");
        Box::new(MemoryClipboard::new())
    };

    let input = shared_input(tokio::io::BufReader::new(tokio::io::stdin()));
    let mut shell = Shell::new(config, store, input.clone(), clipboard);

    for file in &args.files {
        if let Err(err) = shell.open_file(file).await {
            eprintln!("error: {:#}", err);
        }
    }

    shell.run(input).await
}
