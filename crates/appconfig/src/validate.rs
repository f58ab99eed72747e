//! Shape validation.
//!
//! Checks that a default composite only contains the categories each root
//! accepts before any input is merged into it. Every violation is collected.

use crate::error::{Diagnostic, DiagnosticKind};
use crate::value::{Kind, Value};

/// Categories accepted as `args` leaves.
pub const ARGS_TYPES: &[Kind] = &[Kind::String, Kind::Boolean];
/// Categories accepted as `env` leaves.
pub const ENV_TYPES: &[Kind] = &[Kind::String];
/// Categories accepted anywhere under `config`.
pub const CONFIG_TYPES: &[Kind] = &[Kind::String, Kind::Number, Kind::Boolean, Kind::Object];

/// Validate `shape` rooted at `root` against the `allowed` categories.
///
/// The root itself must be an object. Nested objects are only descended
/// into when [`Kind::Object`] is allowed; otherwise they are violations
/// like any other disallowed category.
#[must_use]
pub fn validate_shape(shape: &Value, root: &str, allowed: &[Kind]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    match shape {
        Value::Object(map) => {
            for (key, child) in map {
                validate_node(child, &format!("{root}.{key}"), allowed, &mut diagnostics);
            }
        },
        other => diagnostics.push(Diagnostic::new(
            root,
            DiagnosticKind::InvalidType {
                found: other.kind(),
                expected: vec![Kind::Object],
            },
        )),
    }

    diagnostics
}

fn validate_node(value: &Value, path: &str, allowed: &[Kind], diagnostics: &mut Vec<Diagnostic>) {
    let found = value.kind();
    if !allowed.contains(&found) {
        diagnostics.push(Diagnostic::new(
            path,
            DiagnosticKind::InvalidType {
                found,
                expected: allowed.to_vec(),
            },
        ));
        return;
    }

    if let Value::Object(map) = value {
        for (key, child) in map {
            validate_node(child, &format!("{path}.{key}"), allowed, diagnostics);
        }
    }
}
