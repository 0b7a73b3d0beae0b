//! gamemeta - command-line front end for the metadata resolver
//!
//! **Usage:**
//! ```bash
//! gamemeta [--config <FILE>] search <TITLE> [--platform windows|linux|mac]... [--max <N>]
//! gamemeta [--config <FILE>] lookup <ID>
//! ```
//!
//! Results are printed to stdout as pretty JSON; logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gamemeta_common::config::{load_config, CONFIG_ENV_VAR};
use gamemeta_common::logging::init_tracing;
use gamemeta_common::Error;
use gamemeta_resolver::{MetadataResolver, Platform};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;

/// Resolve game titles and ids into canonical metadata
#[derive(Parser, Debug)]
#[clap(name = "gamemeta", version)]
struct Args {
    /// Config file (overrides the environment variable and default location)
    #[clap(long, value_name = "FILE", env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search all sources by title
    Search {
        title: String,

        /// Keep only results available on this platform (repeatable)
        #[clap(long = "platform", value_name = "PLATFORM")]
        platforms: Vec<Platform>,

        /// Maximum number of results
        #[clap(long = "max", value_name = "N")]
        max_results: Option<usize>,
    },
    /// Resolve one record by its source id
    Lookup { id: String },
}

/// Reject blank positional arguments before any source is contacted
fn require_text<'a>(what: &str, value: &'a str) -> gamemeta_common::Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", what)));
    }
    Ok(trimmed)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_tracing(&config.logging)?;
    info!("gamemeta {}", env!("CARGO_PKG_VERSION"));

    let resolver = MetadataResolver::from_config(&config)?;

    let output = match args.command {
        Command::Search {
            title,
            platforms,
            max_results,
        } => {
            let title = require_text("title", &title)?;
            let filter: BTreeSet<Platform> = platforms.into_iter().collect();
            let max_results = max_results.unwrap_or_else(|| resolver.default_max_results());
            let results = resolver.fetch_by_title(title, &filter, max_results).await;
            serde_json::to_string_pretty(&results)?
        }
        Command::Lookup { id } => {
            let id = require_text("id", &id)?;
            let record = resolver.fetch_by_id(id).await;
            serde_json::to_string_pretty(&record)?
        }
    };

    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_rejects_blank() {
        assert!(matches!(require_text("id", ""), Err(Error::InvalidInput(_))));
        let err = require_text("title", "   ").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: title must not be empty");
    }

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("id", " 1207664663 ").unwrap(), "1207664663");
    }

    #[test]
    fn test_parse_search_args() {
        let args = Args::try_parse_from([
            "gamemeta", "search", "Thief", "--platform", "windows", "--platform", "linux", "--max", "3",
        ])
        .unwrap();
        match args.command {
            Command::Search {
                title,
                platforms,
                max_results,
            } => {
                assert_eq!(title, "Thief");
                assert_eq!(platforms, vec![Platform::Windows, Platform::Linux]);
                assert_eq!(max_results, Some(3));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_lookup_args() {
        let args = Args::try_parse_from(["gamemeta", "lookup", "620"]).unwrap();
        assert!(matches!(args.command, Command::Lookup { id } if id == "620"));
    }
}
