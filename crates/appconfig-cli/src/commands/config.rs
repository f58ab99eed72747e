//! CLI handlers for `appconfig show` and `appconfig check`.

use anyhow::{Context, Result};
use appconfig::sources::read_source;
use appconfig::{AppConfig, Loader, ShowFormat};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::SourceArgs;

type Dynamic = AppConfig<serde_json::Value, serde_json::Value, serde_json::Value>;

/// Composite defaults as written in a shape file. Omitted sections are empty.
#[derive(Debug, Deserialize)]
struct ShapeFile {
    #[serde(default = "empty_section")]
    args: serde_json::Value,
    #[serde(default = "empty_section")]
    env: serde_json::Value,
    #[serde(default = "empty_section")]
    config: serde_json::Value,
}

fn empty_section() -> serde_json::Value {
    json!({})
}

/// Read the shape file and load every source into it.
fn load_composite(sources: &SourceArgs) -> Result<Dynamic> {
    let raw = read_source(&sources.shape)
        .with_context(|| format!("failed to read shape file {}", sources.shape.display()))?;
    let shape: ShapeFile = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse shape file {}", sources.shape.display()))?;

    let mut app = AppConfig::new(shape.args, shape.env, shape.config);

    let mut loader = Loader::new();
    if !sources.env_paths.is_empty() {
        loader = loader.with_env_paths(sources.env_paths.iter().cloned());
    }
    if !sources.config_paths.is_empty() {
        loader = loader.with_config_paths(sources.config_paths.iter().cloned());
    }
    info!(loader = ?loader, "loading configuration");

    loader.load_with_args(&mut app, &sources.tokens)?;
    Ok(app)
}

/// Load and print the merged configuration.
pub(crate) fn show_config(sources: &SourceArgs, format: &str, section: Option<&str>) -> Result<()> {
    let app = load_composite(sources)?;

    let show_format = match format {
        "json" => ShowFormat::Json,
        _ => ShowFormat::Yaml,
    };

    let output = app
        .show(show_format, section)
        .context("failed to format configuration")?;

    println!("{}", output.trim_end());
    Ok(())
}

/// Load the configuration and report success.
pub(crate) fn check_config(sources: &SourceArgs) -> Result<()> {
    load_composite(sources).context("Configuration is invalid")?;
    println!("Configuration is valid.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use appconfig::PROCESS_ENV;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    fn source_args(dir: &Path, shape: &str) -> SourceArgs {
        SourceArgs {
            shape: dir.join(shape),
            env_paths: Vec::new(),
            config_paths: Vec::new(),
            tokens: Vec::new(),
        }
    }

    #[test]
    fn test_load_composite() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "shape.yaml",
            "args:\n  profile: local\n  debug: false\nenv:\n  APPCONFIG_TEST_TOKEN: ''\nconfig:\n  server:\n    port: 8080\n",
        );
        let env = write(dir.path(), ".env", "APPCONFIG_TEST_TOKEN=abc\n");
        let config = write(dir.path(), "config.yaml", "server:\n  port: '9090'\n");

        let mut sources = source_args(dir.path(), "shape.yaml");
        sources.env_paths = vec![env];
        sources.config_paths = vec![config];
        sources.tokens = vec!["profile=dev".to_owned(), "debug".to_owned()];

        let app = load_composite(&sources).unwrap();
        assert_eq!(app.args, json!({ "profile": "dev", "debug": true }));
        assert_eq!(app.env, json!({ "APPCONFIG_TEST_TOKEN": "abc" }));
        assert_eq!(app.config, json!({ "server": { "port": 9090 } }));
    }

    #[test]
    fn test_omitted_sections_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shape.yaml", "config:\n  name: app\n");

        let mut sources = source_args(dir.path(), "shape.yaml");
        sources.env_paths = vec![String::new()];
        sources.config_paths = vec![String::new()];

        let app = load_composite(&sources).unwrap();
        assert_eq!(app.args, json!({}));
        assert_eq!(app.env, json!({}));
        assert_eq!(app.config, json!({ "name": "app" }));
    }

    #[test]
    fn test_missing_shape_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_composite(&source_args(dir.path(), "missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read shape file"));
    }

    #[test]
    fn test_check_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shape.yaml", "config:\n  name: app\n");
        let config = write(dir.path(), "config.yaml", "nmae: typo\n");

        let mut sources = source_args(dir.path(), "shape.yaml");
        sources.env_paths = vec![PROCESS_ENV.to_owned()];
        sources.config_paths = vec![config];

        let err = check_config(&sources).unwrap_err();
        assert!(err.to_string().contains("Configuration is invalid"));
    }
}
