//! Typed composite and the load orchestrator.
//!
//! Each stage runs against an untyped [`Section`] and is committed back into
//! the caller's typed struct as soon as it succeeds. A failing stage aborts
//! the load, leaving earlier sections merged and later ones untouched.

use std::borrow::Cow;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::args::parse_arguments;
use crate::config::{load_config_file, parse_config};
use crate::env::{collect_env_vars, load_env_sources, parse_environment};
use crate::error::{ConfigError, ConfigResult, Diagnostic};
use crate::schema::{Section, SectionKind};
use crate::sources::{DEFAULT_CONFIG_PATHS, DEFAULT_ENV_PATHS, config_paths};
use crate::value::Value;

/// The composite of defaults that a load fills in.
///
/// Each section may be any serde type whose serialized form is a valid shape:
/// `args` a flat map of strings and booleans, `env` a flat map of strings,
/// `config` nested maps of strings, numbers and booleans. `null` is never a
/// valid shape value, so `Option` fields must be skipped when `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig<A, E, C> {
    /// Command-line arguments.
    pub args: A,
    /// Environment variables.
    pub env: E,
    /// Configuration file contents.
    pub config: C,
}

impl<A, E, C> AppConfig<A, E, C> {
    /// Create a composite from its three sections.
    #[must_use]
    pub fn new(args: A, env: E, config: C) -> Self {
        Self { args, env, config }
    }
}

type EnvPathsFn<A> = Box<dyn Fn(&A) -> Vec<String>>;
type ConfigPathsFn<A, E> = Box<dyn Fn(&A, &E) -> Vec<String>>;
type ValidatorFn<A, E, C> = Box<dyn Fn(&AppConfig<A, E, C>) -> bool>;

enum EnvPaths<A> {
    Fixed(Vec<String>),
    Derived(EnvPathsFn<A>),
}

impl<A> EnvPaths<A> {
    fn resolve(&self, args: &A) -> Vec<String> {
        match self {
            Self::Fixed(paths) => paths.clone(),
            Self::Derived(derive) => derive(args),
        }
    }
}

enum ConfigPaths<A, E> {
    Fixed(Vec<String>),
    Derived(ConfigPathsFn<A, E>),
}

impl<A, E> ConfigPaths<A, E> {
    fn resolve(&self, args: &A, env: &E) -> Vec<String> {
        match self {
            Self::Fixed(paths) => paths.clone(),
            Self::Derived(derive) => derive(args, env),
        }
    }
}

/// Builder for loading an [`AppConfig`].
///
/// A single load is expected per composite at a time; the loader itself
/// holds no state between loads.
pub struct Loader<A, E, C> {
    env_paths: EnvPaths<A>,
    config_paths: ConfigPaths<A, E>,
    validator: Option<ValidatorFn<A, E, C>>,
    env_vars: Option<HashMap<String, String>>,
}

impl<A, E, C> Default for Loader<A, E, C> {
    fn default() -> Self {
        Self {
            env_paths: EnvPaths::Fixed(to_owned_paths(DEFAULT_ENV_PATHS)),
            config_paths: ConfigPaths::Fixed(to_owned_paths(DEFAULT_CONFIG_PATHS)),
            validator: None,
            env_vars: None,
        }
    }
}

impl<A, E, C> fmt::Debug for Loader<A, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_paths: &dyn fmt::Debug = match &self.env_paths {
            EnvPaths::Fixed(paths) => paths,
            EnvPaths::Derived(_) => &"<derived>",
        };
        let config_paths: &dyn fmt::Debug = match &self.config_paths {
            ConfigPaths::Fixed(paths) => paths,
            ConfigPaths::Derived(_) => &"<derived>",
        };
        f.debug_struct("Loader")
            .field("env_paths", env_paths)
            .field("config_paths", config_paths)
            .field("validator", &self.validator.is_some())
            .field("env_vars", &self.env_vars.as_ref().map(HashMap::len))
            .finish()
    }
}

impl<A, E, C> Loader<A, E, C>
where
    A: Serialize + DeserializeOwned,
    E: Serialize + DeserializeOwned,
    C: Serialize + DeserializeOwned,
{
    /// Create a loader with the default sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed list of env source descriptors.
    #[must_use]
    pub fn with_env_paths<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.env_paths = EnvPaths::Fixed(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Derive env source descriptors from the parsed arguments.
    #[must_use]
    pub fn with_env_paths_fn(mut self, derive: impl Fn(&A) -> Vec<String> + 'static) -> Self {
        self.env_paths = EnvPaths::Derived(Box::new(derive));
        self
    }

    /// Use a fixed list of config file paths.
    #[must_use]
    pub fn with_config_paths<S: Into<String>>(
        mut self,
        paths: impl IntoIterator<Item = S>,
    ) -> Self {
        self.config_paths = ConfigPaths::Fixed(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Derive config file paths from the parsed arguments and environment.
    #[must_use]
    pub fn with_config_paths_fn(
        mut self,
        derive: impl Fn(&A, &E) -> Vec<String> + 'static,
    ) -> Self {
        self.config_paths = ConfigPaths::Derived(Box::new(derive));
        self
    }

    /// Reject the fully merged composite unless `validator` returns `true`.
    #[must_use]
    pub fn with_validator(
        mut self,
        validator: impl Fn(&AppConfig<A, E, C>) -> bool + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Read the live environment from `env_vars` instead of the process.
    #[must_use]
    pub fn with_env_vars(mut self, env_vars: HashMap<String, String>) -> Self {
        self.env_vars = Some(env_vars);
        self
    }

    /// Load from the process arguments, env sources and config files.
    ///
    /// # Errors
    ///
    /// See [`Loader::load_with_args`].
    pub fn load(&self, app: &mut AppConfig<A, E, C>) -> ConfigResult<()> {
        self.load_with_args(app, unicode_args(std::env::args_os().skip(1)))
    }

    /// Load from explicit argument tokens plus env sources and config files.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage: an invalid composite
    /// shape, malformed arguments, an unreadable source, an invalid config
    /// document, or a rejection by the validator.
    ///
    /// Each config file is committed to `app.config` once it merges cleanly,
    /// so a failing file leaves the values of earlier files in place.
    pub fn load_with_args<I>(&self, app: &mut AppConfig<A, E, C>, tokens: I) -> ConfigResult<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut sections = Sections::prepare(app)?;

        parse_arguments(&mut sections.args, tokens)?;
        commit(&sections.args, &mut app.args)?;

        let env_paths = self.env_paths.resolve(&app.args);
        debug!(sources = ?env_paths, "resolved env sources");
        let env_vars = match &self.env_vars {
            Some(env_vars) => Cow::Borrowed(env_vars),
            None => Cow::Owned(collect_env_vars()),
        };
        load_env_sources(&mut sections.env, &env_paths, &*env_vars)?;
        commit(&sections.env, &mut app.env)?;

        let paths = config_paths(&self.config_paths.resolve(&app.args, &app.env));
        debug!(sources = ?paths, "resolved config sources");
        for path in &paths {
            let mut staged = sections.config.clone();
            load_config_file(&mut staged, path)?;
            commit(&staged, &mut app.config)?;
            sections.config = staged;
        }
        debug!(count = paths.len(), "config sources merged");

        self.validate(app)
    }

    /// Load from literal values without touching the process or filesystem.
    ///
    /// Configured sources are ignored; config diagnostics are attributed to
    /// the `static` origin.
    ///
    /// # Errors
    ///
    /// Same as [`Loader::load_with_args`], minus the I/O failures.
    pub fn load_static<I, L>(
        &self,
        app: &mut AppConfig<A, E, C>,
        tokens: I,
        env_lines: L,
        raw_config: &str,
    ) -> ConfigResult<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        let mut sections = Sections::prepare(app)?;

        parse_arguments(&mut sections.args, tokens)?;
        commit(&sections.args, &mut app.args)?;

        parse_environment(&mut sections.env, env_lines);
        commit(&sections.env, &mut app.env)?;

        parse_config(&mut sections.config, raw_config, None)?;
        commit(&sections.config, &mut app.config)?;

        self.validate(app)
    }

    fn validate(&self, app: &AppConfig<A, E, C>) -> ConfigResult<()> {
        match &self.validator {
            Some(validator) if !validator(app) => {
                warn!("Invalid AppConfig: final validation rejected the merged configuration");
                Err(ConfigError::ValidationFailed)
            },
            _ => Ok(()),
        }
    }
}

struct Sections {
    args: Section,
    env: Section,
    config: Section,
}

impl Sections {
    /// Encode the typed defaults and validate all three shapes together.
    fn prepare<A, E, C>(app: &AppConfig<A, E, C>) -> ConfigResult<Self>
    where
        A: Serialize,
        E: Serialize,
        C: Serialize,
    {
        let mut diagnostics = Vec::new();
        let args = build(SectionKind::Args, encode(SectionKind::Args, &app.args)?, &mut diagnostics);
        let env = build(SectionKind::Env, encode(SectionKind::Env, &app.env)?, &mut diagnostics);
        let config = build(
            SectionKind::Config,
            encode(SectionKind::Config, &app.config)?,
            &mut diagnostics,
        );

        match (args, env, config) {
            (Some(args), Some(env), Some(config)) if diagnostics.is_empty() => {
                Ok(Self { args, env, config })
            },
            _ => {
                warn!("Invalid config structure:");
                for diagnostic in &diagnostics {
                    warn!("{diagnostic}");
                }
                Err(ConfigError::InvalidStructure { diagnostics })
            },
        }
    }
}

fn build(kind: SectionKind, shape: Value, diagnostics: &mut Vec<Diagnostic>) -> Option<Section> {
    match Section::from_shape(kind, shape) {
        Ok(section) => Some(section),
        Err(found) => {
            diagnostics.extend(found);
            None
        },
    }
}

fn encode<T: Serialize>(kind: SectionKind, typed: &T) -> ConfigResult<Value> {
    serde_json::to_value(typed)
        .map(Value::from_json)
        .map_err(|source| ConfigError::Encode {
            section: kind.label(),
            source,
        })
}

fn commit<T: DeserializeOwned>(section: &Section, slot: &mut T) -> ConfigResult<()> {
    *slot = serde_json::from_value(section.to_json()).map_err(|source| ConfigError::Decode {
        section: section.kind().label(),
        source,
    })?;
    Ok(())
}

fn to_owned_paths(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|path| (*path).to_owned()).collect()
}

/// Keep the arguments that are valid unicode, warning about the rest.
fn unicode_args(args: impl IntoIterator<Item = OsString>) -> Vec<String> {
    args.into_iter()
        .filter_map(|arg| match arg.into_string() {
            Ok(arg) => Some(arg),
            Err(arg) => {
                warn!(argument = ?arg, "skipping argument that is not valid unicode");
                None
            },
        })
        .collect()
}
