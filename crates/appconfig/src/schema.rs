//! Explicit schemas extracted from default shapes.
//!
//! A [`Section`] pairs the schema of one root (`args`, `env`, `config`)
//! with the mutable value tree every stage writes into. The schema is fixed
//! once extracted: merging changes values, never categories.

use std::collections::BTreeMap;

use crate::cast::Target;
use crate::error::Diagnostic;
use crate::validate::{ARGS_TYPES, CONFIG_TYPES, ENV_TYPES, validate_shape};
use crate::value::{Kind, Map, Value};

/// Which root of the composite a section belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Flat string/boolean command-line arguments.
    Args,
    /// Flat string environment variables.
    Env,
    /// Nested configuration document.
    Config,
}

impl SectionKind {
    /// Root label used in shape diagnostics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Args => "args",
            Self::Env => "env",
            Self::Config => "config",
        }
    }

    /// Categories accepted in this section.
    #[must_use]
    pub fn allowed(self) -> &'static [Kind] {
        match self {
            Self::Args => ARGS_TYPES,
            Self::Env => ENV_TYPES,
            Self::Config => CONFIG_TYPES,
        }
    }
}

/// What a schema expects at one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// A scalar of the given category.
    Leaf(Target),
    /// Further nesting.
    Nested(Schema),
}

/// Field name to expectation, recursively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: BTreeMap<String, Field>,
}

impl Schema {
    /// Extract the schema implied by a shape's current values.
    ///
    /// Values without a cast target (null, arrays) are skipped; shapes are
    /// validated before extraction so none remain in practice.
    #[must_use]
    pub fn from_shape(shape: &Map) -> Self {
        let fields = shape
            .iter()
            .filter_map(|(key, value)| {
                let field = match value {
                    Value::Object(nested) => Field::Nested(Self::from_shape(nested)),
                    other => Field::Leaf(Target::of(other)?),
                };
                Some((key.clone(), field))
            })
            .collect();
        Self { fields }
    }

    /// The expectation for a direct child.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// The expectation at a nested path, if every segment exists.
    #[must_use]
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&Field> {
        let (first, rest) = path.split_first()?;
        let mut field = self.fields.get(first.as_ref())?;
        for segment in rest {
            match field {
                Field::Nested(schema) => field = schema.fields.get(segment.as_ref())?,
                Field::Leaf(_) => return None,
            }
        }
        Some(field)
    }

    /// Iterate over direct children.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(key, field)| (key.as_str(), field))
    }

    /// Number of direct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A validated root: its schema plus the value tree being merged into.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    kind: SectionKind,
    schema: Schema,
    values: Map,
}

impl Section {
    /// Validate `shape` for `kind` and extract its schema.
    ///
    /// # Errors
    ///
    /// Returns every shape violation if the shape is not valid for `kind`.
    pub fn from_shape(kind: SectionKind, shape: Value) -> Result<Self, Vec<Diagnostic>> {
        let diagnostics = validate_shape(&shape, kind.label(), kind.allowed());
        match shape {
            Value::Object(values) if diagnostics.is_empty() => Ok(Self {
                kind,
                schema: Schema::from_shape(&values),
                values,
            }),
            _ => Err(diagnostics),
        }
    }

    /// Which root this section is.
    #[must_use]
    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    /// The fixed schema of this section.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Current values.
    #[must_use]
    pub fn values(&self) -> &Map {
        &self.values
    }

    /// Consume the section, keeping its values.
    #[must_use]
    pub fn into_values(self) -> Map {
        self.values
    }

    /// Current value at a nested path.
    #[must_use]
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let (leaf, parents) = path.split_last()?;
        let mut current = &self.values;
        for segment in parents {
            current = current.get(segment.as_ref())?.as_object()?;
        }
        current.get(leaf.as_ref())
    }

    /// Overwrite the existing value at `path`. Returns `false` without
    /// touching anything when the path does not exist.
    pub(crate) fn set<S: AsRef<str>>(&mut self, path: &[S], value: Value) -> bool {
        let Some((leaf, parents)) = path.split_last() else {
            return false;
        };

        let mut current = &mut self.values;
        for segment in parents {
            match current.get_mut(segment.as_ref()) {
                Some(Value::Object(next)) => current = next,
                _ => return false,
            }
        }

        match current.get_mut(leaf.as_ref()) {
            Some(slot) => {
                *slot = value;
                true
            },
            None => false,
        }
    }

    /// Values as JSON, ready to be deserialized into a typed section.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        Value::Object(self.values.clone()).to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_shape() -> Value {
        let raw: serde_yaml::Value = serde_yaml::from_str(
            r#"
            auth:
              enable: false
              expiration: 0
              issuer: ""
            name: app
            "#,
        )
        .unwrap();
        Value::from_yaml(raw)
    }

    #[test]
    fn test_schema_extraction() {
        let section = Section::from_shape(SectionKind::Config, config_shape()).unwrap();
        let schema = section.schema();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.get("name"), Some(&Field::Leaf(Target::String)));
        assert_eq!(
            schema.lookup(&["auth", "expiration"]),
            Some(&Field::Leaf(Target::Number))
        );
        assert!(matches!(schema.lookup(&["auth"]), Some(Field::Nested(_))));
        assert_eq!(schema.lookup(&["auth", "typo"]), None);
        assert_eq!(schema.lookup(&["name", "deeper"]), None);
    }

    #[test]
    fn test_invalid_shape_is_rejected() {
        let shape = Value::Object(Map::from([("n".to_owned(), Value::Number(1.0))]));
        let diagnostics = Section::from_shape(SectionKind::Args, shape).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].path, "args.n");
    }

    #[test]
    fn test_set_only_overwrites_existing_paths() {
        let mut section = Section::from_shape(SectionKind::Config, config_shape()).unwrap();

        assert!(section.set(&["auth", "issuer"], Value::from("niurop")));
        assert_eq!(section.get(&["auth", "issuer"]), Some(&Value::from("niurop")));

        assert!(!section.set(&["auth", "typo"], Value::from("x")));
        assert!(!section.set(&["name", "deeper"], Value::from("x")));
        assert!(!section.set::<&str>(&[], Value::Null));
        assert_eq!(section.get(&["auth", "typo"]), None);
    }
}
