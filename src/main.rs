//! # Scribe - A Tabbed Text Editor
//!
//! Multi-document editing with a line-number gutter, driven from the
//! terminal.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start with an empty untitled-1 tab
//! cargo run
//!
//! # Open files, one tab each
//! cargo run -- README.md notes.md
//! ```
//!
//! Menu commands are typed at the prompt: `new`, `open <path>`,
//! `save`, `saveas`, `close [n]`, `tab <n>`, `type <text>`, `quit`.

mod host;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scribe_core::{Config, DocumentTabManager, FsIo};

/// Scribe - a tabbed text editor
#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to open
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Configuration file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();

    tracing::info!("Starting Scribe v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let canonicalize = config.files.canonicalize_paths;

    let mut manager = DocumentTabManager::with_config(
        &config,
        Box::new(FsIo),
        Box::new(host::TerminalDialogs::new(canonicalize)),
        host::open_clipboard(),
    );

    for file in &args.files {
        // Failures were already reported; keep going with the rest.
        let _ = manager.open_document(host::resolve_path(file, canonicalize));
    }
    manager.sync_active();

    host::run(&mut manager, canonicalize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["scribe"]);
        assert!(args.files.is_empty());
        assert!(args.config.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args_with_files() {
        let args = Args::parse_from(["scribe", "a.md", "b.md", "-vv"]);
        assert_eq!(args.files, [PathBuf::from("a.md"), PathBuf::from("b.md")]);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_args_with_config() {
        let args = Args::parse_from(["scribe", "--config", "/tmp/scribe.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/scribe.toml")));
    }
}
