use thiserror::Error;
use url::Url;

/// Candle widths, in seconds, accepted by the Coinbase candles endpoint.
pub const ALLOWED_GRANULARITY_SECONDS: [u32; 8] = [60, 300, 900, 1800, 3600, 7200, 21600, 86400];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid format: {field} - {message}")]
    InvalidFormat { field: String, message: String },
    #[error("Value not allowed: {field} = {value}")]
    NotAllowed { field: String, value: String },
    #[error("Missing required field: {0}")]
    MissingField(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Requires a non-blank value.
pub fn validate_required(value: Option<String>, field: &str) -> ValidationResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError::MissingField(field.to_string())),
    }
}

/// Accepts only absolute http(s) URLs with a host.
pub fn validate_http_url(raw: &str, field: &str) -> ValidationResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ValidationError::InvalidUrl(format!("{}: {} ({})", field, raw, e)))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ValidationError::InvalidUrl(format!(
            "{}: {} (expected an http or https URL)",
            field, raw
        ))),
    }
}

pub fn validate_granularity_seconds(raw: &str) -> ValidationResult<u32> {
    let seconds: u32 = raw.trim().parse().map_err(|_| ValidationError::InvalidFormat {
        field: "COINBASE_GRANULARITY_SECONDS".to_string(),
        message: format!("'{}' is not a whole number of seconds", raw),
    })?;

    if ALLOWED_GRANULARITY_SECONDS.contains(&seconds) {
        Ok(seconds)
    } else {
        Err(ValidationError::NotAllowed {
            field: "COINBASE_GRANULARITY_SECONDS".to_string(),
            value: seconds.to_string(),
        })
    }
}

/// Positive whole number of seconds.
pub fn validate_timeout_seconds(raw: &str, field: &str) -> ValidationResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            message: format!("'{}' is not a positive number of seconds", raw),
        }),
        Ok(seconds) => Ok(seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_validation() {
        assert_eq!(
            validate_required(Some(" mongodb://localhost ".to_string()), "MONGODB_URI").unwrap(),
            "mongodb://localhost"
        );
        assert_eq!(
            validate_required(Some("   ".to_string()), "MONGODB_URI"),
            Err(ValidationError::MissingField("MONGODB_URI".to_string()))
        );
        assert!(validate_required(None, "MONGODB_URI").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(validate_http_url("https://api.coingecko.com/api/v3", "test").is_ok());
        assert!(validate_http_url("http://localhost:8080", "test").is_ok());
        assert!(validate_http_url("ftp://example.com", "test").is_err());
        assert!(validate_http_url("invalid-url", "test").is_err());
        assert!(validate_http_url("", "test").is_err());
    }

    #[test]
    fn test_granularity_validation() {
        for allowed in ALLOWED_GRANULARITY_SECONDS {
            assert_eq!(validate_granularity_seconds(&allowed.to_string()), Ok(allowed));
        }
        assert!(matches!(
            validate_granularity_seconds("999"),
            Err(ValidationError::NotAllowed { .. })
        ));
        assert!(matches!(
            validate_granularity_seconds("one minute"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_granularity_seconds("-60").is_err());
    }

    #[test]
    fn test_timeout_validation() {
        assert_eq!(validate_timeout_seconds("30", "HTTP_TIMEOUT_SECONDS"), Ok(30));
        assert!(validate_timeout_seconds("0", "HTTP_TIMEOUT_SECONDS").is_err());
        assert!(validate_timeout_seconds("soon", "HTTP_TIMEOUT_SECONDS").is_err());
    }
}
