//! Type-directed merge of decoded documents into the `config` section.
//!
//! The walk follows the document rather than the schema, so keys that the
//! schema does not know about are found and reported. Every leaf is cast to
//! the category of the default it replaces. Problems are accumulated; the
//! walk never stops early.

use tracing::trace;

use crate::cast::{Target, cast};
use crate::error::{Diagnostic, DiagnosticKind};
use crate::schema::{Field, Section};
use crate::value::{Kind, Value};

/// Categories a document leaf may have.
const LEAF_TYPES: &[Kind] = &[Kind::String, Kind::Number, Kind::Boolean, Kind::Null];

/// Merge `document` into `section` in place and return every problem found.
///
/// Leaves that merge cleanly are written even when other leaves fail.
/// A `null` document (an empty file) changes nothing, as does a `null` at a
/// position the schema expects to be nested.
#[must_use]
pub fn merge_document(section: &mut Section, document: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut path = Vec::new();
    merge_node(section, document, &mut path, &mut diagnostics);
    diagnostics
}

fn merge_node(
    section: &mut Section,
    node: &Value,
    path: &mut Vec<String>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match node {
        Value::Object(children) => {
            if let Some(Field::Leaf(expected)) = section.schema().lookup(path) {
                diagnostics.push(Diagnostic::new(
                    path.join("."),
                    DiagnosticKind::CannotCast {
                        found: Kind::Object,
                        expected: *expected,
                    },
                ));
                return;
            }
            for (key, child) in children {
                path.push(key.clone());
                merge_node(section, child, path, diagnostics);
                path.pop();
            }
        },
        Value::Array(_) | Value::Unsupported(_) => diagnostics.push(Diagnostic::new(
            path.join("."),
            DiagnosticKind::InvalidType {
                found: node.kind(),
                expected: LEAF_TYPES.to_vec(),
            },
        )),
        Value::Null | Value::String(_) | Value::Number(_) | Value::Boolean(_) => {
            merge_leaf(section, node, path, diagnostics);
        },
    }
}

fn merge_leaf(
    section: &mut Section,
    node: &Value,
    path: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) {
    // The document root stands in for the whole section.
    let expected = if path.is_empty() {
        Some(Target::Object)
    } else {
        section.schema().lookup(path).map(|field| match field {
            Field::Leaf(target) => *target,
            Field::Nested(_) => Target::Object,
        })
    };

    let Some(expected) = expected else {
        diagnostics.push(Diagnostic::new(path.join("."), DiagnosticKind::Unknown));
        return;
    };

    match (expected, cast(node, expected)) {
        (_, None) => diagnostics.push(Diagnostic::new(
            path.join("."),
            DiagnosticKind::CannotCast {
                found: node.kind(),
                expected,
            },
        )),
        (Target::Object, Some(_)) => {
            trace!(path = %path.join("."), "null section keeps its defaults");
        },
        (_, Some(value)) => {
            section.set(path, value);
        },
    }
}
