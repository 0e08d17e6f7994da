//! CLI module for wayfarer
//!
//! Argument parsing for the local development binary. Uses clap for parsing
//! and owo-colors for terminal output.

pub mod init;
pub mod output;
pub mod repl;

use crate::i18n::Language;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wayfarer - AI travel planning
///
/// Drives the travel-planning core from a terminal: chat with the assistant,
/// browse the map markers, open destinations and save itineraries.
#[derive(Parser, Debug)]
#[command(
    name = "wayfarer",
    version,
    about = "Wayfarer - AI travel planning core",
    after_help = "EXAMPLES:\n    \
                  wayfarer init                 # Write wayfarer.toml and .env.example\n    \
                  wayfarer run                  # Start an interactive session\n    \
                  wayfarer --lang zh run        # Session in Chinese\n    \
                  wayfarer config --validate    # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "wayfarer.toml", global = true)]
    pub config: PathBuf,

    /// Override the configured language (en or zh)
    #[arg(long, global = true, value_parser = parse_language)]
    pub lang: Option<Language>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start an interactive session (default)
    Run,

    /// Write a default wayfarer.toml and .env.example
    Init {
        /// Directory to initialize
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Configure a local Ollama server instead of a hosted endpoint
        #[arg(long)]
        ollama: bool,
    },

    /// Show configuration information
    Config {
        /// Only validate, reporting missing secrets as warnings
        #[arg(long)]
        validate: bool,
    },
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["wayfarer"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("wayfarer.toml"));
        assert!(cli.command.is_none());
        assert!(cli.lang.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["wayfarer", "run", "--lang", "zh", "--no-color", "--log-json"])
                .unwrap();
        assert_eq!(cli.command, Some(Commands::Run));
        assert_eq!(cli.lang, Some(Language::Zh));
        assert!(cli.no_color);
        assert!(cli.log_json);
    }

    #[test]
    fn test_init_and_config() {
        let cli = Cli::try_parse_from(["wayfarer", "init", "/tmp/trip", "--ollama"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Init {
                path: PathBuf::from("/tmp/trip"),
                force: false,
                ollama: true
            })
        );
        let cli = Cli::try_parse_from(["wayfarer", "config", "--validate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Config { validate: true }));
    }

    #[test]
    fn test_bad_language_is_rejected() {
        assert!(Cli::try_parse_from(["wayfarer", "--lang", "fr", "run"]).is_err());
    }
}
