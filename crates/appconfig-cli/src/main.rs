//! appconfig CLI - inspect layered configuration loads.
//!
//! Reads a composite shape of defaults, merges the given arguments, env
//! sources and YAML files into it, and prints or checks the result.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use appconfig_telemetry::{LogConfig, LogFormat};
use clap::{ArgAction, Args, Parser, Subcommand};

mod commands;

use commands::config;

/// appconfig - layered configuration loader
#[derive(Parser)]
#[command(name = "appconfig")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Log format: compact (default), pretty, json or full
    #[arg(long, global = true, default_value = "compact", env = "APPCONFIG_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and print the merged configuration
    Show {
        /// Output format (yaml or json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
        /// Show only one section (args, env or config)
        #[arg(short, long)]
        section: Option<String>,
        #[command(flatten)]
        sources: SourceArgs,
    },
    /// Load the configuration and report whether it is valid
    Check {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

/// Where the composite and its inputs come from.
#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// YAML file holding the default composite (`args`, `env`, `config`)
    #[arg(long, default_value = "appconfig.yaml")]
    shape: PathBuf,

    /// Env source, a `KEY=value` file or `@process` (repeatable, in order)
    #[arg(long = "env-path")]
    env_paths: Vec<String>,

    /// YAML config file (repeatable, later files override earlier ones)
    #[arg(long = "config-path")]
    config_paths: Vec<String>,

    /// Argument tokens (`key=value` or `flag`), given after `--`
    #[arg(last = true)]
    tokens: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::for_verbosity(cli.verbose).with_format(cli.log_format);
    if let Err(e) = appconfig_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match cli.command {
        Commands::Show {
            format,
            section,
            sources,
        } => config::show_config(&sources, &format, section.as_deref()),
        Commands::Check { sources } => config::check_config(&sources),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from([
            "appconfig",
            "-vv",
            "show",
            "--format",
            "json",
            "--shape",
            "shape.yaml",
            "--env-path",
            ".env",
            "--env-path",
            "@process",
            "--config-path",
            "config.yaml",
            "--",
            "profile=dev",
            "flag",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Compact);
        let Commands::Show {
            format, sources, ..
        } = cli.command
        else {
            panic!("expected show");
        };
        assert_eq!(format, "json");
        assert_eq!(sources.shape, PathBuf::from("shape.yaml"));
        assert_eq!(sources.env_paths, vec![".env", "@process"]);
        assert_eq!(sources.config_paths, vec!["config.yaml"]);
        assert_eq!(sources.tokens, vec!["profile=dev", "flag"]);
    }

    #[test]
    fn test_parse_check_defaults() {
        let cli = Cli::try_parse_from(["appconfig", "check", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        let Commands::Check { sources } = cli.command else {
            panic!("expected check");
        };
        assert_eq!(sources.shape, PathBuf::from("appconfig.yaml"));
        assert!(sources.env_paths.is_empty());
        assert!(sources.tokens.is_empty());
    }

    #[test]
    fn test_default_log_config_from_flags() {
        let cli = Cli::try_parse_from(["appconfig", "check"]).unwrap();
        let config = LogConfig::for_verbosity(cli.verbose).with_format(cli.log_format);
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.target, appconfig_telemetry::LogTarget::Stderr);
    }

    #[test]
    fn test_invalid_log_format_is_rejected() {
        assert!(Cli::try_parse_from(["appconfig", "--log-format", "xml", "check"]).is_err());
    }
}
