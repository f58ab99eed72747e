//! `key` / `key=value` token splitting shared by arguments and env lines.

/// Split on the first `=` only.
///
/// The key is everything before the first `=`; the value is everything after
/// it, possibly empty and possibly containing further `=`. A token without
/// `=` has no value at all, which is distinct from an empty value.
#[must_use]
pub fn split_on_equals(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (token, None),
    }
}
