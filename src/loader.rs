//! This module fetches JSON documents from the SchedJoules API

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use crate::config::{SdkConfig, DEFAULT_LOCALE, PRODUCT_NAME};
use crate::configurable::{Configurable, Properties};
use crate::utils::lock;


/// A raw HTTP response
#[derive(Clone, Debug)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    /// Whether this status is a success (redirections are fine too)
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// Something that is able to perform an authenticated GET request
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url`, sending `authorization` as the `Authorization` header
    async fn get(&self, url: &str, authorization: &str) -> Result<Response, Box<dyn Error + Send + Sync>>;
}

/// A [`Transport`] that actually reaches the network
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let product_name = PRODUCT_NAME.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let client = reqwest::Client::builder()
            .user_agent(format!("{}/{}", product_name, env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, authorization: &str) -> Result<Response, Box<dyn Error + Send + Sync>> {
        let res = self.client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;
        let status = res.status().as_u16();
        let body = res.text().await?;
        Ok(Response { status, body })
    }
}


/// Why a document could not be loaded
#[derive(Debug)]
pub enum LoadError {
    /// No HTTP transport is available in this environment
    Unsupported,
    /// There was a connection error of some sort
    Transport(String),
    /// We reached the server, but it returned an error
    Status { status: u16, body: String },
    /// The server answered with something that is not JSON
    Json(serde_json::Error),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Unsupported => write!(f, "no HTTP transport is available"),
            LoadError::Transport(msg) => write!(f, "connection error: {}", msg),
            LoadError::Status { status, body } => write!(f, "HTTP {}: {}", status, body),
            LoadError::Json(err) => write!(f, "invalid JSON: {}", err),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl LoadError {
    /// Report this error on the diagnostic channel, and drop it.
    ///
    /// This is what happens to every failure in "fire-and-forget" operations.
    pub fn log(&self, path: &str) {
        match self {
            LoadError::Unsupported => log::debug!("Not loading {}: {}", path, self),
            LoadError::Transport(_) => log::warn!("An error occurred while connecting to the API ({}): {}", path, self),
            LoadError::Status { .. } => log::warn!("The API returned an error ({}): {}", path, self),
            LoadError::Json(_) => log::error!("Unable to decode the API response ({}): {}", path, self),
        }
    }
}


/// Settings used to build requests
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub uri: String,
    pub version: String,
    pub locale: String,
    pub location: String,
    pub api_key: Option<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::from(&SdkConfig::default())
    }
}

impl From<&SdkConfig> for LoaderConfig {
    fn from(config: &SdkConfig) -> Self {
        Self {
            uri: config.uri.trim_end_matches('/').to_string(),
            version: config.version.clone(),
            locale: config.locale.clone(),
            location: config.location.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

impl Configurable for LoaderConfig {}

impl LoaderConfig {
    /// Build the complete URL for a path, with the locale when it is not the API default
    pub fn url_for(&self, path: &str) -> String {
        let mut params = String::new();
        if self.locale != DEFAULT_LOCALE {
            params.push_str("?locale=");
            params.push_str(&self.locale);
        }
        format!("{}{}{}", self.uri, path, params)
    }

    /// The value of the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("Token token=\"{}\"", self.api_key.as_deref().unwrap_or_default())
    }
}


/// Issues authenticated GET requests and decodes their JSON bodies
pub struct Loader {
    config: Mutex<LoaderConfig>,
    /// `None` when no transport could be set up. In this case, nothing is ever requested.
    transport: Option<Arc<dyn Transport>>,
}

impl Loader {
    pub fn new(config: LoaderConfig, transport: Option<Arc<dyn Transport>>) -> Self {
        Self { config: Mutex::new(config), transport }
    }

    /// Shallow-merge some settings into this loader
    pub fn configure(&self, source: &Properties) -> Result<(), serde_json::Error> {
        lock(&self.config).configure(source)?;
        Ok(())
    }

    /// A snapshot of the current settings
    pub fn config(&self) -> LoaderConfig {
        lock(&self.config).clone()
    }

    pub fn locale(&self) -> String {
        lock(&self.config).locale.clone()
    }

    pub(crate) fn set_locale(&self, locale: &str) {
        lock(&self.config).locale = locale.to_string();
    }

    pub fn url_for(&self, path: &str) -> String {
        lock(&self.config).url_for(path)
    }

    /// Fetch a document
    pub async fn fetch(&self, path: &str) -> Result<Value, LoadError> {
        let transport = match &self.transport {
            None => return Err(LoadError::Unsupported),
            Some(t) => t.clone(),
        };

        let (url, authorization) = {
            let config = lock(&self.config);
            if config.api_key.is_none() {
                log::debug!("No API key is set, {} will probably be rejected", path);
            }
            (config.url_for(path), config.authorization())
        };

        log::debug!("GET {}", url);
        let response = transport.get(&url, &authorization).await
            .map_err(|err| LoadError::Transport(err.to_string()))?;

        if response.is_success() == false {
            return Err(LoadError::Status { status: response.status, body: response.body });
        }

        serde_json::from_str(&response.body).map_err(LoadError::Json)
    }

    /// Fetch a document and hand it to `on_success`.
    ///
    /// Failures are logged and otherwise dropped: `on_success` is just never called.
    pub async fn load<F>(&self, path: &str, on_success: F)
    where
        F: FnOnce(Value),
    {
        match self.fetch(path).await {
            Ok(data) => on_success(data),
            Err(err) => err.log(path),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::mock_transport::MockTransport;

    fn config(locale: &str) -> LoaderConfig {
        LoaderConfig {
            locale: locale.to_string(),
            api_key: Some("abc".to_string()),
            ..LoaderConfig::default()
        }
    }

    #[test]
    fn default_locale_has_no_query_string() {
        assert_eq!(config("en").url_for("/pages/123"), "https://api.schedjoules.com/pages/123");
    }

    #[test]
    fn other_locales_are_appended() {
        assert_eq!(config("fr").url_for("/pages/123"), "https://api.schedjoules.com/pages/123?locale=fr");
    }

    #[test]
    fn version_and_location_are_not_part_of_urls() {
        let c = LoaderConfig { version: "v9".to_string(), location: "nl".to_string(), ..config("en") };
        assert_eq!(c.url_for("/languages"), "https://api.schedjoules.com/languages");
    }

    #[test]
    fn authorization_header() {
        assert_eq!(config("en").authorization(), "Token token=\"abc\"");
    }

    #[test]
    fn configure_keeps_other_settings() {
        let loader = Loader::new(config("en"), None);
        let props = json!({"api_key": "new-key"}).as_object().cloned().unwrap();
        loader.configure(&props).unwrap();
        assert_eq!(loader.config().api_key.as_deref(), Some("new-key"));
        assert_eq!(loader.locale(), "en");
    }

    #[tokio::test]
    async fn missing_transport_is_a_silent_gate() {
        let loader = Loader::new(config("en"), None);
        assert!(matches!(loader.fetch("/pages/1").await, Err(LoadError::Unsupported)));

        let mut called = false;
        loader.load("/pages/1", |_| called = true).await;
        assert!(called == false);
    }

    #[tokio::test]
    async fn success_and_failures() {
        let mock = Arc::new(MockTransport::new());
        mock.respond("https://api.schedjoules.com/ok", 200, json!({"hello": "world"}));
        mock.respond_raw("https://api.schedjoules.com/garbage", 200, "<html>");
        mock.respond("https://api.schedjoules.com/denied", 401, json!({}));
        mock.fail("https://api.schedjoules.com/down");
        let loader = Loader::new(config("en"), Some(mock.clone()));

        assert_eq!(loader.fetch("/ok").await.unwrap(), json!({"hello": "world"}));
        assert!(matches!(loader.fetch("/garbage").await, Err(LoadError::Json(_))));
        assert!(matches!(loader.fetch("/denied").await, Err(LoadError::Status { status: 401, .. })));
        assert!(matches!(loader.fetch("/down").await, Err(LoadError::Transport(_))));
        assert!(matches!(loader.fetch("/unknown").await, Err(LoadError::Status { status: 404, .. })));

        let requests = mock.requests();
        assert_eq!(requests.len(), 5);
        assert!(requests.iter().all(|r| r.authorization == "Token token=\"abc\""));
    }

    #[tokio::test]
    async fn callback_only_runs_on_success() {
        let mock = Arc::new(MockTransport::new());
        mock.respond("https://api.schedjoules.com/ok", 302, json!([1, 2]));
        mock.respond("https://api.schedjoules.com/broken", 500, json!({}));
        let loader = Loader::new(config("en"), Some(mock));

        let mut received = None;
        loader.load("/ok", |data| received = Some(data)).await;
        assert_eq!(received, Some(json!([1, 2])));

        let mut called = false;
        loader.load("/broken", |_| called = true).await;
        assert!(called == false);
    }
}
