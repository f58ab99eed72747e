//! Rendering a merged composite for humans.

use serde::Serialize;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::AppConfig;

/// Output format for [`AppConfig::show`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShowFormat {
    /// YAML, the format config files are written in.
    #[default]
    Yaml,
    /// Pretty-printed JSON (for programmatic consumption).
    Json,
}

impl<A, E, C> AppConfig<A, E, C>
where
    A: Serialize,
    E: Serialize,
    C: Serialize,
{
    /// Render the whole composite, or only `section` (`args`, `env` or
    /// `config`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Show`] if `section` is not one of the three
    /// sections or serialization fails.
    pub fn show(&self, format: ShowFormat, section: Option<&str>) -> ConfigResult<String> {
        let value = match section {
            None => serde_json::to_value(self).map_err(show_error)?,
            Some("args") => serde_json::to_value(&self.args).map_err(show_error)?,
            Some("env") => serde_json::to_value(&self.env).map_err(show_error)?,
            Some("config") => serde_json::to_value(&self.config).map_err(show_error)?,
            Some(other) => {
                return Err(ConfigError::Show {
                    message: format!("unknown section '{other}', expected args, env or config"),
                });
            },
        };

        match format {
            ShowFormat::Yaml => serde_yaml::to_string(&value).map_err(show_error),
            ShowFormat::Json => serde_json::to_string_pretty(&value).map_err(show_error),
        }
    }
}

fn show_error(err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Show {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> AppConfig<serde_json::Value, serde_json::Value, serde_json::Value> {
        AppConfig::new(
            json!({ "flag": true }),
            json!({ "SECRET": "s" }),
            json!({ "auth": { "expiration": 3600 } }),
        )
    }

    #[test]
    fn test_show_yaml() {
        let out = sample().show(ShowFormat::Yaml, None).unwrap();
        assert!(out.contains("args:"));
        assert!(out.contains("flag: true"));
        assert!(out.contains("expiration: 3600"));
    }

    #[test]
    fn test_show_json_section() {
        let out = sample().show(ShowFormat::Json, Some("config")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!({ "auth": { "expiration": 3600 } }));
    }

    #[test]
    fn test_show_unknown_section() {
        let err = sample().show(ShowFormat::Yaml, Some("secrets")).unwrap_err();
        assert!(matches!(err, ConfigError::Show { .. }));
    }
}
