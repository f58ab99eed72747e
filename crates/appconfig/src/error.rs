use std::fmt;
use std::io;

use thiserror::Error;

use crate::cast::Target;
use crate::value::Kind;

/// One problem found while walking a shape or a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Dotted path from the root of the walked tree.
    pub path: String,
    /// What went wrong at `path`.
    pub kind: DiagnosticKind,
}

/// Categories of [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The node is of a category not allowed at this position.
    InvalidType {
        /// Observed category.
        found: Kind,
        /// Categories that would have been accepted.
        expected: Vec<Kind>,
    },
    /// The path has no counterpart in the shape.
    Unknown,
    /// The node cannot be converted to what the shape expects.
    CannotCast {
        /// Observed category.
        found: Kind,
        /// Category required by the shape.
        expected: Target,
    },
}

impl Diagnostic {
    /// Create a diagnostic for `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "<root>"
        } else {
            self.path.as_str()
        };
        match &self.kind {
            DiagnosticKind::InvalidType { found, expected } => {
                let expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "{path} has invalid type: {found}. Valid types are: {}",
                    expected.join(", ")
                )
            },
            DiagnosticKind::Unknown => write!(f, "{path} does not exist in config"),
            DiagnosticKind::CannotCast { found, expected } => {
                write!(f, "Cannot cast {path} of type {found} to {expected}")
            },
        }
    }
}

/// A known argument token used the wrong way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentProblem {
    /// A string argument given without `=value`.
    MissingValue(String),
    /// A boolean flag given with `=value`.
    UnexpectedValue(String),
}

impl fmt::Display for ArgumentProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue(token) => write!(f, "Argument without value: {token}"),
            Self::UnexpectedValue(token) => write!(f, "Flag with value: {token}"),
        }
    }
}

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The default composite contains types outside the allowed sets.
    #[error("Invalid AppConfig structure: {} problem(s)", diagnostics.len())]
    InvalidStructure {
        /// Every offending shape path.
        diagnostics: Vec<Diagnostic>,
    },

    /// Known argument tokens were malformed.
    #[error("Invalid Arguments: {} problem(s)", problems.len())]
    InvalidArguments {
        /// Every malformed token.
        problems: Vec<ArgumentProblem>,
    },

    /// A config document did not fit the config shape.
    #[error("Invalid Config: {} problem(s) in {origin}", diagnostics.len())]
    InvalidConfig {
        /// Path of the source file, or `static` for literal input.
        origin: String,
        /// Every offending document path.
        diagnostics: Vec<Diagnostic>,
    },

    /// The caller-supplied validator rejected the merged composite.
    #[error("Invalid AppConfig: final validation rejected the merged configuration")]
    ValidationFailed,

    /// Failed to read a source file.
    #[error("Failed to read source file at {path}: {source}")]
    Read {
        /// Path of the source file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A source file exceeded the size limit.
    #[error("Source file at {path} is {size} bytes, exceeding the {limit} byte limit")]
    SourceTooLarge {
        /// Path of the source file.
        path: String,
        /// Observed size in bytes.
        size: u64,
        /// Maximum accepted size in bytes.
        limit: u64,
    },

    /// Failed to decode YAML.
    #[error("Failed to parse YAML from {origin}: {source}")]
    Parse {
        /// Path of the source file, or `static` for literal input.
        origin: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A typed section could not be turned into a shape.
    #[error("Failed to encode {section} section: {source}")]
    Encode {
        /// `args`, `env` or `config`.
        section: &'static str,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Merged values could not be turned back into a typed section.
    #[error("Failed to decode {section} section: {source}")]
    Decode {
        /// `args`, `env` or `config`.
        section: &'static str,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to render a composite for display.
    #[error("Failed to render configuration: {message}")]
    Show {
        /// Rendering failure description.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
