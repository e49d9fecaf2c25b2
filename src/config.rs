//! Configuration for the conversion client.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. The builder validates the base URL up front so a
//! typo surfaces as [`File2JsonError::InvalidConfig`] at startup instead of
//! as a connection failure after the user has already picked a file.

use crate::error::File2JsonError;
use serde::{Deserialize, Serialize};

/// Base URL of the public conversion service.
pub const DEFAULT_BASE_URL: &str = "http://apiconversaoarquivos-luscabr2.runasp.net";

/// Path of the conversion endpoint, relative to the base URL.
pub const CONVERT_PATH: &str = "/api/convert/";

/// Configuration for a [`crate::client::ConversionClient`].
///
/// # Example
/// ```rust
/// use file2json::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://localhost:5000")
///     .timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint(), "http://localhost:5000/api/convert/");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme and host of the conversion service, with an optional path
    /// prefix. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Whole-request timeout in seconds. Default: None.
    ///
    /// `None` leaves reqwest's default in place, which never times out on its
    /// own. Large spreadsheets can take the service a long while to process.
    pub timeout_secs: Option<u64>,

    /// `User-Agent` header sent with the upload.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            user_agent: concat!("file2json/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the conversion endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CONVERT_PATH)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim().to_string();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, File2JsonError> {
        let c = &self.config;
        if c.base_url.is_empty() {
            return Err(File2JsonError::InvalidConfig("base URL is empty".into()));
        }
        let parsed = reqwest::Url::parse(&c.endpoint()).map_err(|e| {
            File2JsonError::InvalidConfig(format!("base URL '{}' is invalid: {e}", c.base_url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(File2JsonError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if c.timeout_secs == Some(0) {
            return Err(File2JsonError::InvalidConfig(
                "timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_points_at_public_service() {
        let c = ClientConfig::default();
        assert_eq!(
            c.endpoint(),
            "http://apiconversaoarquivos-luscabr2.runasp.net/api/convert/"
        );
        assert!(c.timeout_secs.is_none());
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        let c = ClientConfig::builder()
            .base_url("https://example.com/prefix/")
            .build()
            .unwrap();
        assert_eq!(c.endpoint(), "https://example.com/prefix/api/convert/");
    }

    #[test]
    fn rejects_empty_and_non_http_urls() {
        assert!(ClientConfig::builder().base_url("  ").build().is_err());
        assert!(ClientConfig::builder().base_url("not a url").build().is_err());
        assert!(ClientConfig::builder()
            .base_url("ftp://example.com")
            .build()
            .is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ClientConfig::builder().timeout_secs(0).build().unwrap_err();
        assert!(matches!(err, File2JsonError::InvalidConfig(_)));
    }
}
