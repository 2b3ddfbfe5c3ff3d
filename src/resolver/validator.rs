// URL normalizer & validator
//
// Raw user input -> canonical absolute http(s) URL + detected provider.

use tracing::debug;
use url::Url;

use super::errors::ValidationError;
use super::providers::{detect_provider, MediaProvider, ProviderId};

/// A normalized absolute http/https URL with its provider
#[derive(Debug, Clone)]
pub struct ValidatedUrl {
    normalized_url: String,
    provider: &'static MediaProvider,
    host: String,
}

impl ValidatedUrl {
    pub fn as_str(&self) -> &str {
        &self.normalized_url
    }

    pub fn provider(&self) -> &'static MediaProvider {
        self.provider
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl std::fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized_url)
    }
}

/// Parse `candidate` as an absolute URL, retrying with an `https://` prefix.
pub fn normalize_url(candidate: &str) -> Result<Url, ValidationError> {
    let trimmed = candidate.trim();
    let invalid = || ValidationError::InvalidUrl {
        input: trimmed.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(_) => Url::parse(&format!("https://{}", trimmed)).map_err(|_| invalid())?,
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid()),
    }
}

/// Validate user input and detect its provider.
pub fn validate_media_url(candidate: &str) -> Result<ValidatedUrl, ValidationError> {
    let url = normalize_url(candidate)?;
    // normalize_url guarantees a host
    let host = url.host_str().unwrap_or_default().to_string();

    let Some(provider) = detect_provider(&host, url.path()) else {
        debug!(host = %host, "no provider matches URL");
        return Err(ValidationError::UnsupportedProvider { host });
    };

    debug!(url = %url, provider = %provider.id, "validated media URL");

    Ok(ValidatedUrl {
        normalized_url: url.to_string(),
        provider,
        host,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::errors::ErrorCode;

    #[test]
    fn test_bare_host_gets_https_prefix() {
        let url = normalize_url("example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_short_youtube_link_without_scheme() {
        let validated = validate_media_url("youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(validated.provider_id(), ProviderId::Youtube);
        assert_eq!(validated.as_str(), "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let validated =
            validate_media_url("  https://www.youtube.com/watch?v=dQw4w9WgXcQ \n").unwrap();
        assert_eq!(
            validated.as_str(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_empty_input_is_invalid() {
        for input in ["", "   ", "\t\n"] {
            let err = validate_media_url(input).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidUrl);
        }
    }

    #[test]
    fn test_non_http_scheme_is_invalid() {
        let err = validate_media_url("ftp://example.com/a").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidUrl);

        let err = validate_media_url("javascript:alert(1)").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidUrl);
    }

    #[test]
    fn test_unknown_host_is_unsupported_not_invalid() {
        for input in ["https://example.com/video", "example.com", "http://10.0.0.1/watch"] {
            let err = validate_media_url(input).unwrap_err();
            assert_eq!(err.code(), ErrorCode::UnsupportedProvider, "{input}");
        }
    }

    #[test]
    fn test_host_is_lowercased() {
        let validated = validate_media_url("HTTPS://WWW.YOUTUBE.COM/watch?v=abc").unwrap();
        assert_eq!(validated.host(), "www.youtube.com");
        assert_eq!(validated.provider_id(), ProviderId::Youtube);
    }
}
