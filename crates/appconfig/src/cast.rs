//! Scalar cast engine.
//!
//! Converts an arbitrary [`Value`] into the category a shape leaf expects.
//! `None` means the conversion is impossible and must be reported by the
//! caller; it is never a default.

use std::fmt;

use crate::value::{Kind, Value};

/// Category a value can be cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Text.
    String,
    /// Finite number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Further nesting.
    Object,
}

impl Target {
    /// The target implied by an existing shape value, if it has one.
    #[must_use]
    pub fn of(value: &Value) -> Option<Self> {
        match value.kind() {
            Kind::String => Some(Self::String),
            Kind::Number => Some(Self::Number),
            Kind::Boolean => Some(Self::Boolean),
            Kind::Object => Some(Self::Object),
            Kind::Null | Kind::Array | Kind::Unsupported(_) => None,
        }
    }

    /// The value category this target corresponds to.
    #[must_use]
    pub fn kind(self) -> Kind {
        match self {
            Self::String => Kind::String,
            Self::Number => Kind::Number,
            Self::Boolean => Kind::Boolean,
            Self::Object => Kind::Object,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

/// Cast `value` to `target`.
///
/// | observed | string | number | boolean | object |
/// |---|---|---|---|---|
/// | null | `""` | `0` | `false` | `null` |
/// | string | itself | parsed, finite only | `true`/`false`/`""` | - |
/// | number | formatted | itself | `0`/`1` only | - |
/// | boolean | `"true"`/`"false"` | `1`/`0` | itself | - |
/// | object | - | - | - | itself |
///
/// Arrays and unsupported nodes never cast.
#[must_use]
pub fn cast(value: &Value, target: Target) -> Option<Value> {
    match target {
        Target::String => cast_to_string(value).map(Value::String),
        Target::Number => cast_to_number(value).map(Value::Number),
        Target::Boolean => cast_to_boolean(value).map(Value::Boolean),
        Target::Object => cast_to_object(value),
    }
}

fn cast_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        Value::Number(f) => Some(format_number(*f)),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Object(_) | Value::Array(_) | Value::Unsupported(_) => None,
    }
}

fn cast_to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::String(s) => parse_number(s),
        Value::Number(f) => Some(*f),
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Object(_) | Value::Array(_) | Value::Unsupported(_) => None,
    }
}

#[allow(clippy::float_cmp)]
fn cast_to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Null => Some(false),
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" => Some(true),
            "false" | "" => Some(false),
            _ => None,
        },
        Value::Number(f) if *f == 0.0 => Some(false),
        Value::Number(f) if *f == 1.0 => Some(true),
        Value::Boolean(b) => Some(*b),
        Value::Number(_) | Value::Object(_) | Value::Array(_) | Value::Unsupported(_) => None,
    }
}

fn cast_to_object(value: &Value) -> Option<Value> {
    match value {
        Value::Null | Value::Object(_) => Some(value.clone()),
        Value::String(_)
        | Value::Number(_)
        | Value::Boolean(_)
        | Value::Array(_)
        | Value::Unsupported(_) => None,
    }
}

/// Parse a numeric string. Blank and non-finite input is rejected; `0x`,
/// `0o` and `0b` prefixes are honoured.
#[allow(clippy::cast_precision_loss)]
fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| trimmed.strip_prefix(prefix).map(|digits| (digits, radix)));
    if let Some((digits, radix)) = radix {
        // `from_str_radix` takes a leading sign, a prefixed literal does not.
        if digits.starts_with(['+', '-']) {
            return None;
        }
        return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
    }

    // `f64::from_str` also accepts "inf" and "nan" spellings.
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Format a number the way it was most likely written: integral values
/// without a fractional part and no negative zero. Magnitudes of `1e21`
/// and above or below `1e-6` use exponent notation with an explicit sign,
/// as in `1e+21` and `1.5e-7`.
#[allow(clippy::float_cmp)]
fn format_number(f: f64) -> String {
    if f == 0.0 {
        return "0".to_owned();
    }
    let magnitude = f.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return f.to_string();
    }
    let formatted = format!("{f:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{mantissa}e+{exponent}"),
        _ => formatted,
    }
}
