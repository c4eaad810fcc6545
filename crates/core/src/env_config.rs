//! Environment variable parsing with warn-level logging for invalid values.

use crate::error::CoreError;

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    parse_env_value(var, std::env::var(var).ok().as_deref(), default)
}

/// Read a variable that must be present and non-blank.
///
/// # Errors
/// Returns `CoreError::MissingEnv` when the variable is unset or blank.
pub fn require_env(var: &str) -> Result<String, CoreError> {
    require_env_value(var, std::env::var(var).ok().as_deref())
}

/// Read an optional variable, treating blank values as unset.
#[must_use]
pub fn optional_env(var: &str) -> Option<String> {
    non_blank(std::env::var(var).ok().as_deref())
}

fn parse_env_value<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    raw: Option<&str>,
    default: T,
) -> T {
    let Some(value) = raw else {
        return default;
    };
    match value.trim().parse() {
        Ok(n) => n,
        Err(_) => {
            tracing::warn!(var, value, default = %default, "invalid env var value, using default");
            default
        },
    }
}

fn require_env_value(var: &str, raw: Option<&str>) -> Result<String, CoreError> {
    non_blank(raw).ok_or_else(|| CoreError::MissingEnv(var.to_owned()))
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}
