//! Environment variable helpers used by service configuration loaders.
//!
//! Configuration is read once at startup, so missing required values panic
//! with the variable name rather than returning an error.

use std::str::FromStr;

/// Read a required variable.
///
/// # Panics
///
/// Panics if the variable is unset or not valid unicode.
pub fn required(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"))
}

/// Read an optional variable, treating empty values as unset.
pub fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse an optional variable, falling back to `default` when the
/// variable is unset or does not parse.
pub fn parsed_or<T: FromStr>(name: &str, default: T) -> T {
    optional(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
