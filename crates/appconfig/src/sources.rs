//! Source descriptors and file reading.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Env source descriptor meaning "read the live process environment".
pub const PROCESS_ENV: &str = "@process";

/// Env sources used when the caller configures none.
pub const DEFAULT_ENV_PATHS: &[&str] = &[".env", PROCESS_ENV];

/// Config sources used when the caller configures none.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["config.yaml"];

/// Maximum source file size (1 MiB). Prevents OOM from oversized files.
pub const MAX_SOURCE_FILE_SIZE: u64 = 1_048_576;

/// Where one batch of environment lines comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvSource {
    /// A `KEY=value` file.
    File(PathBuf),
    /// The live process environment.
    Process,
}

impl EnvSource {
    /// Interpret a descriptor. Empty descriptors are skipped.
    #[must_use]
    pub fn from_descriptor(descriptor: &str) -> Option<Self> {
        match descriptor {
            "" => None,
            PROCESS_ENV => Some(Self::Process),
            path => Some(Self::File(PathBuf::from(path))),
        }
    }
}

/// Interpret config descriptors as paths, dropping empty ones.
#[must_use]
pub fn config_paths<S: AsRef<str>>(descriptors: &[S]) -> Vec<PathBuf> {
    descriptors
        .iter()
        .map(AsRef::as_ref)
        .filter(|descriptor| !descriptor.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Read a source file as UTF-8 text.
///
/// Uses a single read so a file swapped between a size check and the read
/// cannot slip past the limit.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file is missing or unreadable and
/// [`ConfigError::SourceTooLarge`] if it exceeds [`MAX_SOURCE_FILE_SIZE`].
pub fn read_source(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;

    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if size > MAX_SOURCE_FILE_SIZE {
        return Err(ConfigError::SourceTooLarge {
            path: path.display().to_string(),
            size,
            limit: MAX_SOURCE_FILE_SIZE,
        });
    }

    debug!(path = %path.display(), bytes = size, "read source file");
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_descriptors() {
        assert_eq!(EnvSource::from_descriptor(""), None);
        assert_eq!(
            EnvSource::from_descriptor(PROCESS_ENV),
            Some(EnvSource::Process)
        );
        assert_eq!(
            EnvSource::from_descriptor(".env.local"),
            Some(EnvSource::File(PathBuf::from(".env.local")))
        );
    }

    #[test]
    fn test_config_paths_skip_empty() {
        let paths = config_paths(&["base.yaml", "", "local.yaml"]);
        assert_eq!(
            paths,
            vec![PathBuf::from("base.yaml"), PathBuf::from("local.yaml")]
        );
    }

    #[test]
    fn test_read_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "name: app\n").unwrap();

        assert_eq!(read_source(&path).unwrap(), "name: app\n");
    }

    #[test]
    fn test_missing_source_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_oversized_source_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.yaml");
        let size = usize::try_from(MAX_SOURCE_FILE_SIZE).unwrap().saturating_add(1);
        std::fs::write(&path, "#".repeat(size)).unwrap();

        let err = read_source(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SourceTooLarge { size: s, .. } if s == MAX_SOURCE_FILE_SIZE.saturating_add(1)
        ));
    }
}
