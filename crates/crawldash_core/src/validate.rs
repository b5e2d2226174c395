use url::Url;

use crate::ValidationError;

/// Checks a user-entered job URL before it is submitted.
///
/// Returns the trimmed URL; only absolute `http`/`https` addresses are accepted.
pub fn validate_job_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    let parsed = Url::parse(trimmed).map_err(|err| ValidationError::Malformed(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }
    if parsed.host_str().is_none() {
        return Err(ValidationError::Malformed("missing host".to_string()));
    }
    Ok(trimmed.to_string())
}
