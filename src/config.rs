//! Client configuration.
//!
//! Everything the front end needs to know about the server lives in
//! [`ClientConfig`], built via [`ClientConfigBuilder`]. Only the base URL is
//! required in practice; the rest have defaults matching the upload page.

use crate::error::ConfigError;
use reqwest::Url;

/// Default server address used by the web tool.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";

/// Path of the processing endpoint.
pub const DEFAULT_PROCESS_PATH: &str = "/process";

/// Configuration for talking to the OCR service.
///
/// # Example
/// ```rust
/// use pdf_ocr_web::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://localhost:5001")
///     .request_timeout_secs(300)
///     .build()
///     .unwrap();
/// assert_eq!(config.process_url().as_str(), "http://localhost:5001/process");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin, e.g. `http://127.0.0.1:5001`. Relative links in the
    /// server reply (`/view_image/...`) resolve against it.
    pub base_url: Url,

    /// Path of the multipart upload endpoint. Default: `/process`.
    pub process_path: String,

    /// Whole-request timeout in seconds. Default: none.
    ///
    /// OCR of a large batch can take minutes, so by default the request waits
    /// for the server for as long as the connection stays open.
    pub request_timeout_secs: Option<u64>,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            process_path: DEFAULT_PROCESS_PATH.to_string(),
            request_timeout_secs: None,
            user_agent: concat!("pdf-ocr-web/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            base_url: DEFAULT_BASE_URL.to_string(),
            config: Self::default(),
        }
    }

    /// Absolute URL of the processing endpoint.
    pub fn process_url(&self) -> Url {
        self.resolve(&self.process_path)
    }

    /// Resolve a possibly relative link from a server reply.
    ///
    /// Absolute links (the server builds download URLs with its own host)
    /// are returned unchanged.
    pub fn resolve(&self, link: &str) -> Url {
        self.base_url
            .join(link)
            .unwrap_or_else(|_| self.base_url.clone())
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    base_url: String,
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn process_path(mut self, path: impl Into<String>) -> Self {
        self.config.process_path = path.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs.max(1));
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Validate and return the config.
    pub fn build(mut self) -> Result<ClientConfig, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url,
                reason: "scheme must be http or https".into(),
            });
        }
        if !self.config.process_path.starts_with('/') {
            return Err(ConfigError::InvalidProcessPath(self.config.process_path));
        }
        self.config.base_url = url;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let c = ClientConfig::default();
        assert_eq!(c.process_url().as_str(), "http://127.0.0.1:5001/process");
        assert!(c.request_timeout_secs.is_none());
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ClientConfig::builder()
            .base_url("ftp://host")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn rejects_garbage_url() {
        assert!(ClientConfig::builder().base_url("not a url").build().is_err());
    }

    #[test]
    fn rejects_relative_process_path() {
        let err = ClientConfig::builder()
            .process_path("process")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidProcessPath("process".into()));
    }

    #[test]
    fn resolve_keeps_absolute_links() {
        let c = ClientConfig::default();
        assert_eq!(
            c.resolve("http://other:9000/download/s/a.zip").as_str(),
            "http://other:9000/download/s/a.zip"
        );
        assert_eq!(
            c.resolve("/view_image/s/doc/a.png").as_str(),
            "http://127.0.0.1:5001/view_image/s/doc/a.png"
        );
    }

    #[test]
    fn timeout_floor_is_one_second() {
        let c = ClientConfig::builder().request_timeout_secs(0).build().unwrap();
        assert_eq!(c.request_timeout_secs, Some(1));
    }
}
