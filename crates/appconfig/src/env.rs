//! Environment parsing.
//!
//! Environments routinely carry unrelated variables, so unlike arguments
//! parsing never fails: unknown keys are dropped silently and a line without
//! `=` assigns the empty string. Only reading an env file can fail.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::{debug, info};

use crate::error::ConfigResult;
use crate::schema::Section;
use crate::sources::{EnvSource, read_source};
use crate::token::split_on_equals;
use crate::value::Value;

/// Merge `KEY=value` lines into the `env` section in place.
///
/// Returns the number of values applied.
pub fn parse_environment<I>(section: &mut Section, lines: I) -> usize
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut applied: usize = 0;

    for line in lines {
        let line = line.as_ref();
        if line.is_empty() {
            continue;
        }

        let (key, value) = split_on_equals(line);
        if section.schema().get(key).is_some()
            && section.set(&[key], Value::from(value.unwrap_or_default()))
        {
            applied = applied.saturating_add(1);
        }
    }

    applied
}

/// Overwrite every `env` key that is present in a snapshot of the live
/// process environment. Absent variables leave their defaults untouched.
///
/// Returns the number of values applied.
pub fn apply_process_env<S: BuildHasher>(
    section: &mut Section,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let keys: Vec<String> = section
        .schema()
        .fields()
        .map(|(key, _)| key.to_owned())
        .collect();

    let mut applied: usize = 0;
    for key in keys {
        if let Some(value) = env_vars.get(&key) {
            debug!(var = %key, "applying process environment variable");
            if section.set(&[key.as_str()], Value::from(value.as_str())) {
                applied = applied.saturating_add(1);
            }
        }
    }

    applied
}

/// Apply every env source descriptor in order.
///
/// [`PROCESS_ENV`](crate::sources::PROCESS_ENV) reads from `env_vars`, a
/// snapshot of the live environment; empty descriptors are skipped; anything
/// else is read as a `KEY=value` file.
///
/// # Errors
///
/// Returns the read error of the first env file that cannot be read.
pub fn load_env_sources<D, S>(
    section: &mut Section,
    descriptors: &[D],
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<()>
where
    D: AsRef<str>,
    S: BuildHasher,
{
    for descriptor in descriptors {
        match EnvSource::from_descriptor(descriptor.as_ref()) {
            None => {},
            Some(EnvSource::Process) => {
                let applied = apply_process_env(section, env_vars);
                debug!(applied, "loaded process environment");
            },
            Some(EnvSource::File(path)) => {
                let content = read_source(&path)?;
                let applied = parse_environment(section, env_file_lines(&content));
                info!(path = %path.display(), applied, "loaded env file");
            },
        }
    }
    Ok(())
}

/// Split the content of an env file into trimmed, non-blank lines.
#[must_use]
pub fn env_file_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Collect all current environment variables into a map.
///
/// Variables whose name or value is not valid unicode are skipped.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SectionKind;
    use crate::value::Map;

    fn env_section() -> Section {
        let shape = Map::from([
            ("SECRET".to_owned(), Value::from("")),
            ("UNCHANGED".to_owned(), Value::from("unchanged")),
        ]);
        Section::from_shape(SectionKind::Env, Value::Object(shape)).unwrap()
    }

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_parse_environment() {
        let mut section = env_section();

        let applied = parse_environment(
            &mut section,
            ["SECRET=value", "", "unrecognized=value", "invalid", "=invalid"],
        );

        assert_eq!(applied, 1);
        assert_eq!(section.get(&["SECRET"]), Some(&Value::from("value")));
        assert_eq!(section.get(&["UNCHANGED"]), Some(&Value::from("unchanged")));
        assert_eq!(section.values().len(), 2);
    }

    #[test]
    fn test_bare_known_key_sets_empty_string() {
        let mut section = env_section();
        parse_environment(&mut section, ["UNCHANGED"]);
        assert_eq!(section.get(&["UNCHANGED"]), Some(&Value::from("")));
    }

    #[test]
    fn test_later_lines_win() {
        let mut section = env_section();
        parse_environment(&mut section, ["SECRET=first", "SECRET=second=2"]);
        assert_eq!(section.get(&["SECRET"]), Some(&Value::from("second=2")));
    }

    #[test]
    fn test_apply_process_env() {
        let mut section = env_section();
        let env = make_env(&[("SECRET", "from-process"), ("PATH", "/usr/bin")]);

        let applied = apply_process_env(&mut section, &env);

        assert_eq!(applied, 1);
        assert_eq!(section.get(&["SECRET"]), Some(&Value::from("from-process")));
        assert_eq!(section.get(&["UNCHANGED"]), Some(&Value::from("unchanged")));
        assert_eq!(section.get(&["PATH"]), None);
    }

    #[test]
    fn test_load_env_sources_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "SECRET=from-file\nUNCHANGED=from-file\n").unwrap();
        let env = make_env(&[("SECRET", "from-process")]);

        let mut section = env_section();
        let descriptors = [path.display().to_string(), String::new(), "@process".to_owned()];
        load_env_sources(&mut section, &descriptors, &env).unwrap();

        assert_eq!(section.get(&["SECRET"]), Some(&Value::from("from-process")));
        assert_eq!(section.get(&["UNCHANGED"]), Some(&Value::from("from-file")));
    }

    #[test]
    fn test_missing_env_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(".env").display().to_string();

        let mut section = env_section();
        let err = load_env_sources(&mut section, &[missing], &make_env(&[])).unwrap_err();
        assert!(matches!(err, crate::error::ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_file_lines() {
        let content = "  SECRET=value  \r\n\n   \nOTHER=x\n";
        assert_eq!(env_file_lines(content), vec!["SECRET=value", "OTHER=x"]);
    }
}
