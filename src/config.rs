//! Support for library configuration options

use std::error::Error;
use std::path::Path;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::configurable::{Configurable, Properties};

/// Product name sent in the `User-Agent` header of every API request.
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("schedjoules-sdk".to_string())));

/// The locale the API uses when none is requested
pub const DEFAULT_LOCALE: &str = "en";
/// The location the SDK starts with
pub const DEFAULT_LOCATION: &str = "us";
pub const DEFAULT_URI: &str = "https://api.schedjoules.com";
pub const DEFAULT_VERSION: &str = "v1";

/// Prefix of the environment variables read by [`SdkConfig::from_env`]
const ENV_PREFIX: &str = "SCHEDJOULES_";

/// Options recognised by the SDK.
///
/// `version` and `location` are accepted and stored, but are never part of a request URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// API base URI
    pub uri: String,
    pub version: String,
    pub locale: String,
    pub location: String,
    /// Required for any successful call
    pub api_key: Option<String>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            version: DEFAULT_VERSION.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            api_key: None,
        }
    }
}

impl Configurable for SdkConfig {}

impl SdkConfig {
    /// Read a JSON configuration file. Missing properties keep their default values.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = match std::fs::read_to_string(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(content) => content,
        };
        let value: Value = serde_json::from_str(&content)?;
        let properties = match value {
            Value::Object(map) => map,
            _ => return Err(format!("{:?} does not contain a JSON object", path).into()),
        };

        let mut config = Self::default();
        config.configure(&properties)?;
        Ok(config)
    }

    /// Override this configuration with the `SCHEDJOULES_*` environment variables
    pub fn from_env(self) -> Result<Self, Box<dyn Error>> {
        self.with_vars(std::env::vars())
    }

    /// Override this configuration with `SCHEDJOULES_*` variables, e.g. `SCHEDJOULES_API_KEY`
    pub fn with_vars<I>(mut self, vars: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides = Properties::new();
        for (name, value) in vars {
            let key = match name.strip_prefix(ENV_PREFIX) {
                None => continue,
                Some(key) => key.to_ascii_lowercase(),
            };
            match key.as_str() {
                "uri" | "version" | "locale" | "location" | "api_key" => {
                    log::debug!("Configuration: {} set from the environment", key);
                    overrides.insert(key, Value::String(value));
                },
                _ => log::warn!("Ignoring unknown configuration variable {}", name),
            }
        }

        self.configure(&overrides)?;
        Ok(self)
    }

    /// Check that the base URI is a valid URL
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        Url::parse(&self.uri)
            .map_err(|err| format!("Invalid API base URI {:?}: {}", self.uri, err))?;
        Ok(())
    }
}
