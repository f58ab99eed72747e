//! Loosely-typed value tree shared by every stage.
//!
//! Shapes, decoded YAML documents and the values written back into shapes
//! are all expressed as a [`Value`]. Dispatch on the category of a value is
//! always an exhaustive match over [`Kind`].

use std::collections::BTreeMap;
use std::fmt;

/// Ordered object representation.
pub type Map = BTreeMap<String, Value>;

/// 2^63, the first integral `f64` outside `i64`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
/// 2^64, the first integral `f64` outside `u64`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// A decoded or shape value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit absence (`~`, `null`, an empty YAML node).
    Null,
    /// Text.
    String(String),
    /// Any finite number; integers and floats share one representation.
    Number(f64),
    /// `true` / `false`.
    Boolean(bool),
    /// Nested key/value container.
    Object(Map),
    /// Sequence. Never valid in a shape or a document.
    Array(Vec<Value>),
    /// A node outside the recognised categories, with a short description.
    Unsupported(&'static str),
}

/// The category of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// See [`Value::Null`].
    Null,
    /// See [`Value::String`].
    String,
    /// See [`Value::Number`].
    Number,
    /// See [`Value::Boolean`].
    Boolean,
    /// See [`Value::Object`].
    Object,
    /// See [`Value::Array`].
    Array,
    /// See [`Value::Unsupported`].
    Unsupported(&'static str),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Object => write!(f, "object"),
            Self::Array => write!(f, "array"),
            Self::Unsupported(what) => write!(f, "{what}"),
        }
    }
}

impl Value {
    /// The category tag of this value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::String(_) => Kind::String,
            Self::Number(_) => Kind::Number,
            Self::Boolean(_) => Kind::Boolean,
            Self::Object(_) => Kind::Object,
            Self::Array(_) => Kind::Array,
            Self::Unsupported(what) => Kind::Unsupported(*what),
        }
    }

    /// Borrow the inner map if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert the output of the YAML decoder.
    ///
    /// Scalar mapping keys are stringified the way YAML readers expose them
    /// to untyped consumers (`1: x` becomes key `"1"`). Tagged nodes,
    /// non-finite numbers and sequence/mapping keys become
    /// [`Value::Unsupported`] so that the merger can report them.
    #[must_use]
    pub fn from_yaml(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(b) => Self::Boolean(b),
            serde_yaml::Value::Number(n) => match n.as_f64() {
                Some(f) if f.is_finite() => Self::Number(f),
                _ => Self::Unsupported("non-finite number"),
            },
            serde_yaml::Value::String(s) => Self::String(s),
            serde_yaml::Value::Sequence(seq) => {
                Self::Array(seq.into_iter().map(Self::from_yaml).collect())
            },
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = Map::new();
                for (key, child) in mapping {
                    match yaml_key(&key) {
                        Some(name) => {
                            map.insert(name, Self::from_yaml(child));
                        },
                        None => {
                            let name = serde_yaml::to_string(&key)
                                .map(|s| s.trim().to_owned())
                                .unwrap_or_else(|_| "<complex key>".to_owned());
                            map.insert(name, Self::Unsupported("complex mapping key"));
                        },
                    }
                }
                Self::Object(map)
            },
            serde_yaml::Value::Tagged(_) => Self::Unsupported("tagged value"),
        }
    }

    /// Convert a JSON tree produced by serializing a caller's typed section.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map_or(Self::Unsupported("unrepresentable number"), Self::Number),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from_json).collect())
            },
            serde_json::Value::Object(object) => Self::Object(
                object
                    .into_iter()
                    .map(|(key, child)| (key, Self::from_json(child)))
                    .collect(),
            ),
        }
    }

    /// Convert back into JSON so the caller's typed section can be rebuilt.
    ///
    /// Integral numbers are emitted as JSON integers; unsupported nodes
    /// become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null | Self::Unsupported(_) => serde_json::Value::Null,
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Number(f) => number_to_json(*f),
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), child.to_json()))
                    .collect(),
            ),
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            },
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Number(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Object(map)
    }
}

fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some("null".to_owned()),
        serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_)
        | serde_yaml::Value::Tagged(_) => None,
    }
}

#[allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn number_to_json(f: f64) -> serde_json::Value {
    if f.trunc() == f {
        if (-I64_LIMIT..I64_LIMIT).contains(&f) {
            return serde_json::Value::from(f as i64);
        }
        if (0.0..U64_LIMIT).contains(&f) {
            return serde_json::Value::from(f as u64);
        }
    }
    serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::Null.to_string(), "null");
        assert_eq!(Kind::Array.to_string(), "array");
        assert_eq!(Kind::Unsupported("tagged value").to_string(), "tagged value");
    }

    #[test]
    fn test_from_yaml_nested() {
        let raw: serde_yaml::Value = serde_yaml::from_str(
            r"
            auth:
              enable: true
              expiration: 3600
              issuer: niurop
              missing:
            ",
        )
        .unwrap();

        let value = Value::from_yaml(raw);
        let auth = value.as_object().unwrap()["auth"].as_object().unwrap();
        assert_eq!(auth["enable"], Value::Boolean(true));
        assert_eq!(auth["expiration"], Value::Number(3600.0));
        assert_eq!(auth["issuer"], Value::from("niurop"));
        assert_eq!(auth["missing"], Value::Null);
    }

    #[test]
    fn test_from_yaml_scalar_keys_are_stringified() {
        let raw: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\n").unwrap();
        let value = Value::from_yaml(raw);
        let map = value.as_object().unwrap();
        assert_eq!(map["1"], Value::from("one"));
        assert!(map.contains_key("true"));
    }

    #[test]
    fn test_from_yaml_unsupported_nodes() {
        let raw: serde_yaml::Value = serde_yaml::from_str("a: !custom 3\nb: .inf\nc: [1]\n").unwrap();
        let value = Value::from_yaml(raw);
        let map = value.as_object().unwrap();
        assert_eq!(map["a"].kind(), Kind::Unsupported("tagged value"));
        assert_eq!(map["b"].kind(), Kind::Unsupported("non-finite number"));
        assert_eq!(map["c"].kind(), Kind::Array);
    }

    #[test]
    fn test_json_integers_survive_round_trip() {
        let json = serde_json::json!({"port": 8080, "ratio": 0.5, "name": "x"});
        let value = Value::from_json(json.clone());
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_large_integers_stay_integral() {
        let big = 1u64 << 60;
        assert_eq!(Value::from_json(serde_json::json!(big)).to_json(), serde_json::json!(big));

        let top = 1u64 << 63;
        assert_eq!(Value::from_json(serde_json::json!(top)).to_json(), serde_json::json!(top));

        let low = i64::MIN;
        assert_eq!(Value::from_json(serde_json::json!(low)).to_json(), serde_json::json!(low));

        // Beyond u64 only a float is left.
        assert!(Value::Number(1e20).to_json().is_f64());
    }

    #[test]
    fn test_unsupported_becomes_json_null() {
        assert_eq!(
            Value::Unsupported("tagged value").to_json(),
            serde_json::Value::Null
        );
    }
}
