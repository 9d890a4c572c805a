use crate::error::ConfigError;
use url::Url;

/// Where a freshly installed app points: the LM Studio default.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:1234/v1/chat/completions";

/// Settings-table key the endpoint URL is persisted under.
pub const ENDPOINT_SETTING_KEY: &str = "llm_api_endpoint";

/// Validates a candidate endpoint before it is persisted.
///
/// The rule is deliberately thin: non-empty and parseable as an absolute
/// URL. Scheme is not checked, so `ftp://bad` passes; anything that fails
/// here is rejected without touching stored state.
pub fn validate_endpoint(input: &str) -> Result<String, ConfigError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty);
    }
    let parsed = Url::parse(trimmed)?;
    Ok(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_default_endpoint() {
        let url = validate_endpoint(DEFAULT_ENDPOINT).unwrap();
        assert_eq!(url, DEFAULT_ENDPOINT);
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(matches!(validate_endpoint(""), Err(ConfigError::Empty)));
        assert!(matches!(validate_endpoint("   "), Err(ConfigError::Empty)));
    }

    #[test]
    fn rejects_clearly_invalid_strings() {
        assert!(matches!(
            validate_endpoint("not a url"),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(validate_endpoint("/v1/chat/completions").is_err());
    }

    // Scheme is out of scope for the validation rule: any absolute URL
    // parses, so ftp:// is accepted. Asserting the actual behavior here
    // so a future tightening shows up as a deliberate change.
    #[test]
    fn accepts_non_http_schemes() {
        assert!(validate_endpoint("ftp://bad").is_ok());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let url = validate_endpoint("  http://localhost:8080/v1/chat/completions \n").unwrap();
        assert_eq!(url, "http://localhost:8080/v1/chat/completions");
    }
}
