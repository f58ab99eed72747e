#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration loading for command-line applications.
//!
//! An application describes its configuration as an [`AppConfig`] of three
//! sections whose default values double as their schema:
//!
//! - `args`: flat strings (`key=value`) and boolean flags (`flag`);
//! - `env`: flat strings read from `.env` files or the process environment;
//! - `config`: nested strings, numbers and booleans read from YAML files.
//!
//! Every incoming value is cast to the type of the default it replaces.
//! Problems are collected for a whole source and reported together.
//!
//! # Usage
//!
//! ```rust
//! use appconfig::{AppConfig, Loader};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Args {
//!     profile: String,
//!     verbose: bool,
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
//! struct Env {
//!     api_token: String,
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Config {
//!     server: Server,
//! }
//!
//! let mut app = AppConfig::<Args, Env, Config>::default();
//! Loader::new()
//!     .load_static(
//!         &mut app,
//!         ["profile=dev", "verbose"],
//!         ["API_TOKEN=secret"],
//!         "server:\n  host: localhost\n  port: '8080'\n",
//!     )
//!     .unwrap();
//!
//! assert_eq!(app.args.profile, "dev");
//! assert!(app.args.verbose);
//! assert_eq!(app.env.api_token, "secret");
//! assert_eq!(app.config.server.port, 8080);
//! ```
//!
//! # Sources
//!
//! [`Loader::load`] reads the process arguments, then every env source in
//! order (`.env` and the live environment by default), then every YAML file
//! in order (`config.yaml` by default). Later sources override earlier ones
//! field by field. Source lists may be derived from already-parsed sections.

/// Command-line argument parsing.
pub mod args;
/// Scalar cast engine.
pub mod cast;
/// YAML document decoding and merging.
pub mod config;
/// Environment parsing.
pub mod env;
/// Error and diagnostic types.
pub mod error;
/// Typed composite and load orchestration.
pub mod loader;
/// Type-directed document merge.
pub mod merge;
/// Schema extraction and mutable sections.
pub mod schema;
/// Composite display.
pub mod show;
/// Source descriptors and file reading.
pub mod sources;
/// `key=value` token splitting.
pub mod token;
/// Shape validation.
pub mod validate;
/// Tagged value model.
pub mod value;

// Re-export primary types at the crate root.
pub use cast::{Target, cast};
pub use error::{ArgumentProblem, ConfigError, ConfigResult, Diagnostic, DiagnosticKind};
pub use loader::{AppConfig, Loader};
pub use schema::{Field, Schema, Section, SectionKind};
pub use show::ShowFormat;
pub use sources::{DEFAULT_CONFIG_PATHS, DEFAULT_ENV_PATHS, PROCESS_ENV};
pub use value::{Kind, Map, Value};
