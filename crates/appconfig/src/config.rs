//! YAML config documents: decoding, merging and multi-file loading.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::merge::merge_document;
use crate::schema::Section;
use crate::sources::read_source;
use crate::value::Value;

/// Origin reported for documents that did not come from a file.
pub const STATIC_ORIGIN: &str = "static";

/// Decode raw YAML into a [`Value`] tree.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if `raw` is not valid YAML.
pub fn decode_document(raw: &str, origin: &str) -> ConfigResult<Value> {
    serde_yaml::from_str::<serde_yaml::Value>(raw)
        .map(Value::from_yaml)
        .map_err(|source| ConfigError::Parse {
            origin: origin.to_owned(),
            source,
        })
}

/// Decode `raw` and merge it into the `config` section in place.
///
/// `origin` names the source in diagnostics and defaults to
/// [`STATIC_ORIGIN`]. An empty document changes nothing.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed YAML and
/// [`ConfigError::InvalidConfig`] carrying every diagnostic when the
/// document does not fit the section. Every diagnostic is logged first.
pub fn parse_config(section: &mut Section, raw: &str, origin: Option<&str>) -> ConfigResult<()> {
    let origin = origin.unwrap_or(STATIC_ORIGIN);
    let document = decode_document(raw, origin)?;

    let diagnostics = merge_document(section, &document);
    if !diagnostics.is_empty() {
        for diagnostic in &diagnostics {
            warn!("{diagnostic} in {origin}");
        }
        return Err(ConfigError::InvalidConfig {
            origin: origin.to_owned(),
            diagnostics,
        });
    }

    Ok(())
}

/// Read one config file and merge it into `section`.
///
/// # Errors
///
/// Fails if the file cannot be read, decoded or merged.
pub fn load_config_file(section: &mut Section, path: &Path) -> ConfigResult<()> {
    let raw = read_source(path)?;
    parse_config(section, &raw, Some(&path.display().to_string()))?;
    info!(path = %path.display(), "loaded config file");
    Ok(())
}

/// Read and merge every config file in order. Later files override earlier
/// ones field by field.
///
/// # Errors
///
/// Fails on the first file that cannot be read, decoded or merged.
pub fn load_config_files<P: AsRef<Path>>(section: &mut Section, paths: &[P]) -> ConfigResult<()> {
    for path in paths {
        load_config_file(section, path.as_ref())?;
    }
    debug!(count = paths.len(), "config sources merged");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SectionKind;

    fn config_section() -> Section {
        let shape = decode_document(
            r"
            server:
              host: localhost
              port: 8080
            debug: false
            ",
            "shape",
        )
        .unwrap();
        Section::from_shape(SectionKind::Config, shape).unwrap()
    }

    #[test]
    fn test_parse_config_static() {
        let mut section = config_section();
        parse_config(&mut section, "server:\n  port: 9090\ndebug: true\n", None).unwrap();

        assert_eq!(section.get(&["server", "port"]), Some(&Value::Number(9090.0)));
        assert_eq!(section.get(&["server", "host"]), Some(&Value::from("localhost")));
        assert_eq!(section.get(&["debug"]), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_empty_document_is_noop() {
        let mut section = config_section();
        let before = section.clone();
        parse_config(&mut section, "", None).unwrap();
        parse_config(&mut section, "# only a comment\n", None).unwrap();
        assert_eq!(section, before);
    }

    #[test]
    fn test_invalid_config_names_origin() {
        let mut section = config_section();
        let err = parse_config(&mut section, "server:\n  typo: 1\n", None).unwrap_err();

        let ConfigError::InvalidConfig { origin, diagnostics } = err else {
            panic!("expected InvalidConfig, got {err:?}");
        };
        assert_eq!(origin, STATIC_ORIGIN);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].path, "server.typo");
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let mut section = config_section();
        let err = parse_config(&mut section, "server: [unclosed", Some("bad.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref origin, .. } if origin == "bad.yaml"));
    }

    #[test]
    fn test_later_files_override_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.yaml");
        let local = dir.path().join("local.yaml");
        std::fs::write(&base, "server:\n  host: example.com\n  port: 80\n").unwrap();
        std::fs::write(&local, "server:\n  port: 8443\n").unwrap();

        let mut section = config_section();
        load_config_files(&mut section, &[&base, &local]).unwrap();

        assert_eq!(section.get(&["server", "host"]), Some(&Value::from("example.com")));
        assert_eq!(section.get(&["server", "port"]), Some(&Value::Number(8443.0)));
    }

    #[test]
    fn test_file_diagnostics_carry_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "debug: sometimes\n").unwrap();

        let mut section = config_section();
        let err = load_config_files(&mut section, &[&path]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidConfig { ref origin, .. } if origin == &path.display().to_string()
        ));
    }
}
