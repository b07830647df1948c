//! Checks run on the merged configuration.

use std::error::Error;

/// Every required credential must be present and non-empty.
pub fn validate_required(fields: &[(&str, Option<&str>)]) -> Result<(), Box<dyn Error>> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "Missing required configuration: {}",
            missing.join(", ")
        )
        .into())
    }
}

/// Explicitly enabled TLS needs both a certificate and a key.
pub fn validate_tls(
    enabled: Option<bool>,
    cert_path: Option<&str>,
    key_path: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    if enabled != Some(true) {
        return Ok(());
    }

    match (cert_path, key_path) {
        (Some(_), Some(_)) => Ok(()),
        (None, _) => Err("TLS is enabled but TLS_CERT_PATH (tls.cert_path) is not set".into()),
        (_, None) => Err("TLS is enabled but TLS_KEY_PATH (tls.key_path) is not set".into()),
    }
}
