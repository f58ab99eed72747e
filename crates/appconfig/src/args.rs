//! Command-line argument parsing.
//!
//! Tokens are `key=value` for string arguments and bare `key` for boolean
//! flags. Unknown tokens are only warned about; misused known tokens are
//! collected and fail the whole call once every token has been seen.

use tracing::{debug, warn};

use crate::cast::Target;
use crate::error::{ArgumentProblem, ConfigError, ConfigResult};
use crate::schema::{Field, Section};
use crate::token::split_on_equals;
use crate::value::Value;

/// Merge argument `tokens` into the `args` section in place.
///
/// Tokens are trimmed and blank tokens skipped. A string argument requires
/// `=` (an empty value is fine); a flag must not carry one and is set to
/// `true` when present.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidArguments`] listing every string argument
/// given without a value and every flag given with one. Valid tokens seen
/// before, between or after the bad ones are still applied.
pub fn parse_arguments<I>(section: &mut Section, tokens: I) -> ConfigResult<()>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut unrecognised = Vec::new();
    let mut problems = Vec::new();
    let mut applied: usize = 0;

    for token in tokens {
        let token = token.as_ref().trim();
        if token.is_empty() {
            continue;
        }

        let (key, value) = split_on_equals(token);
        let expected = match section.schema().get(key) {
            Some(Field::Leaf(target)) => *target,
            Some(Field::Nested(_)) | None => {
                unrecognised.push(token.to_owned());
                continue;
            },
        };

        let updated = match (expected, value) {
            (Target::String, Some(value)) => section.set(&[key], Value::from(value)),
            (Target::String, None) => {
                problems.push(ArgumentProblem::MissingValue(token.to_owned()));
                continue;
            },
            (_, None) => section.set(&[key], Value::Boolean(true)),
            (_, Some(_)) => {
                problems.push(ArgumentProblem::UnexpectedValue(token.to_owned()));
                continue;
            },
        };
        if updated {
            applied = applied.saturating_add(1);
        }
    }

    for token in &unrecognised {
        warn!("Unrecognised argument: {token}");
    }

    if !problems.is_empty() {
        warn!("Invalid arguments passed to application:");
        for problem in &problems {
            warn!("{problem}");
        }
        return Err(ConfigError::InvalidArguments { problems });
    }

    debug!(count = applied, "applied command-line arguments");
    Ok(())
}
