use crate::utils::error::{EtlError, Result};
use std::fmt::Display;
use std::ops::RangeInclusive;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Display, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Paths, names and prefixes: non-blank and free of NUL bytes.
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "must not be empty"));
    }
    if value.contains('\0') {
        return Err(invalid(field, value.escape_default(), "contains a NUL byte"));
    }
    Ok(())
}

/// The gateway `add` endpoint: an absolute http(s) URL with a host.
pub fn require_http_endpoint(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("not a URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            value,
            format!("scheme '{}' is not http or https", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, value, "URL has no host"));
    }
    Ok(())
}

/// Numeric knobs (retry limit, timeout, pacing) with inclusive bounds.
pub fn require_within<T: PartialOrd + Display>(
    field: &str,
    value: T,
    bounds: RangeInclusive<T>,
) -> Result<()> {
    if bounds.contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            field,
            &value,
            format!("must be between {} and {}", bounds.start(), bounds.end()),
        ))
    }
}
