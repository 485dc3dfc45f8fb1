//! `${VAR}` and `${VAR:-default}` expansion for string settings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Only the braced form is recognised, so literal CSS such as `$primary`
/// or HTML containing a dollar sign passes through untouched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Expand `value` in place, leaving it unchanged on error.
pub(crate) fn expand_in_place(value: &mut String, field: &str) -> Result<(), ConfigError> {
    let expanded = expand_env(value, field)?;
    *value = expanded;
    Ok(())
}

fn lookup(var: &str) -> Result<Option<String>, UnsetVar> {
    std::env::var(var).map(Some).map_err(|_| UnsetVar)
}

/// Marker returned for a variable that is not set.
#[derive(Debug)]
struct UnsetVar;
