//! Environment variable helpers.
//!
//! Empty values are treated as unset so a blank line in `.env` never
//! overrides a default.

use std::env;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// Read a variable, trimmed. `None` when unset or blank.
pub(crate) fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read and parse a variable.
pub(crate) fn parse<T>(name: &str) -> Result<Option<T>, Box<dyn Error>>
where
    T: FromStr,
    T::Err: Display,
{
    match var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {name}: {e}").into()),
        None => Ok(None),
    }
}

/// Read a boolean flag accepting `true/false`, `1/0` and `yes/no`.
pub(crate) fn flag(name: &str) -> Result<Option<bool>, Box<dyn Error>> {
    match var(name).map(|v| v.to_lowercase()) {
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes") => Ok(Some(true)),
        Some(v) if matches!(v.as_str(), "false" | "0" | "no") => Ok(Some(false)),
        Some(v) => Err(format!("Invalid value for {name}: {v}").into()),
        None => Ok(None),
    }
}

/// Read a comma-separated list.
pub(crate) fn list(name: &str) -> Option<Vec<String>> {
    var(name).map(|raw| {
        raw.split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    })
}
