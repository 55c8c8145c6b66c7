//! # cml-studio
//!
//! Command-line access to the CML authoring core.
//!
//! ## Quick Start
//!
//! ```bash
//! # Highlight a snippet, colouring attributes from a pool file
//! cargo run -- highlight rule.cml --suggestions pools.json
//!
//! # Convert labels to ids before committing a snippet
//! cargo run -- translate rule.cml --suggestions pools.json --to storage
//!
//! # What would autocomplete offer at character 42?
//! cargo run -- scan rule.cml --caret 42 --suggestions pools.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cml_core::{Config, TranslationTable};
use cml_services::{
    MemorySnippetStore, PoolFile, RecordContext, Snippet, StaticSuggestions, Studio, TracingNotifier,
};

/// cml-studio - autocomplete, highlighting and translation for CML snippets
#[derive(Parser, Debug)]
#[command(name = "cml-studio")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print highlight markup for a CML file, in display form
    Highlight {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Suggestion pool file (JSON)
        #[arg(short, long, value_name = "POOL")]
        suggestions: Option<PathBuf>,
    },

    /// Rewrite a CML file between label and id form
    Translate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Suggestion pool file (JSON)
        #[arg(short, long, value_name = "POOL")]
        suggestions: PathBuf,

        /// Target form
        #[arg(long, value_enum)]
        to: Form,
    },

    /// Show the caret context and the options autocomplete would offer
    Scan {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Caret position as a character offset
        #[arg(long)]
        caret: usize,

        /// Suggestion pool file (JSON)
        #[arg(short, long, value_name = "POOL")]
        suggestions: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Form {
    /// Labels replaced by ids
    Storage,
    /// Ids replaced by labels
    Display,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting cml-studio v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load(),
    };

    match args.command {
        Command::Highlight { file, suggestions } => {
            let text = read_source(&file)?;
            let mut studio = open_studio(suggestions.as_deref(), &config).await?;
            studio.load_snippet(Snippet {
                id: file.display().to_string(),
                label: file.display().to_string(),
                cml_text: text,
            });
            println!("{}", studio.editor().markup());
        }

        Command::Translate {
            file,
            suggestions,
            to,
        } => {
            let text = read_source(&file)?;
            let pools = load_pools(&suggestions)?;
            let mut table = TranslationTable::new();
            let learned = table.register_items(&pools.identifier_items(&config.popup.default_color));
            tracing::debug!(learned, "translation table built");

            let translated = match to {
                Form::Storage => table.to_storage_form(&text),
                Form::Display => table.to_display_form(&text),
            };
            print!("{translated}");
        }

        Command::Scan {
            file,
            caret,
            suggestions,
        } => {
            let text = read_source(&file)?;
            let mut studio = open_studio(suggestions.as_deref(), &config).await?;
            studio.input_and_fetch(&text, caret).await;

            let editor = studio.editor();
            let report = serde_json::json!({
                "context": editor.context(),
                "state": format!("{:?}", editor.state()),
                "anchor": editor.popup().anchor(),
                "options": editor.popup().options(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_pools(path: &Path) -> anyhow::Result<PoolFile> {
    PoolFile::load(path).with_context(|| format!("loading suggestion pools {}", path.display()))
}

/// A studio over in-memory collaborators, with pools from `pools` if given.
async fn open_studio(pools: Option<&Path>, config: &Config) -> anyhow::Result<Studio> {
    let pools = match pools {
        Some(path) => load_pools(path)?,
        None => PoolFile::default(),
    };

    let mut studio = Studio::new(
        RecordContext::default(),
        Arc::new(StaticSuggestions::new(pools)),
        Arc::new(MemorySnippetStore::new()),
        Arc::new(TracingNotifier),
        config,
    );
    studio.refresh_pools().await;
    Ok(studio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_highlight() {
        let args = Args::parse_from(["cml-studio", "highlight", "rule.cml"]);
        assert_eq!(args.verbose, 0);
        assert!(args.config.is_none());
        let Command::Highlight { file, suggestions } = args.command else {
            panic!("expected highlight");
        };
        assert_eq!(file, PathBuf::from("rule.cml"));
        assert!(suggestions.is_none());
    }

    #[test]
    fn test_args_translate() {
        let args = Args::parse_from([
            "cml-studio", "-vv", "translate", "rule.cml", "-s", "pools.json", "--to", "storage",
        ]);
        assert_eq!(args.verbose, 2);
        let Command::Translate { to, suggestions, .. } = args.command else {
            panic!("expected translate");
        };
        assert_eq!(to, Form::Storage);
        assert_eq!(suggestions, PathBuf::from("pools.json"));
    }

    #[test]
    fn test_args_scan_requires_caret() {
        assert!(Args::try_parse_from(["cml-studio", "scan", "rule.cml"]).is_err());
        let args = Args::try_parse_from([
            "cml-studio", "scan", "rule.cml", "--caret", "12", "--config", "c.toml",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(args.command, Command::Scan { caret: 12, .. }));
    }

    #[tokio::test]
    async fn test_open_studio_without_pools() {
        let studio = open_studio(None, &Config::default()).await.unwrap();
        assert!(studio.editor().pools().merged().is_empty());
    }
}
