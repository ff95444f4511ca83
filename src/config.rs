use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://books.toscrape.com/catalogue/page-{}.html";
pub const DEFAULT_STORE_PATH: &str = "books.csv";

/// How a page reacts to an entry it cannot decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPolicy {
    /// The first broken entry aborts the whole page.
    #[default]
    FailFast,
    /// Broken entries are logged and dropped.
    SkipInvalid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url_template: String,
    pub store_path: PathBuf,
    pub user_agent: String,
    pub request_timeout_seconds: u64,
    pub politeness_delay_ms: u64,
    pub politeness_jitter_ms: u64,
    pub max_pages: Option<u32>,
    pub cheapest_limit: usize,
    pub extraction_policy: ExtractionPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url_template: DEFAULT_BASE_URL.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) BookPriceMonitor/0.1".to_string(),
            request_timeout_seconds: 10,
            politeness_delay_ms: 500,
            politeness_jitter_ms: 0,
            max_pages: None,
            cheapest_limit: crate::analyzer::history::DEFAULT_CHEAPEST,
            extraction_policy: ExtractionPolicy::FailFast,
        }
    }
}

impl AppConfig {
    fn validate(self) -> Result<Self, ConfigError> {
        if !self.base_url_template.contains("{}") {
            return Err(ConfigError::Invalid(format!(
                "base_url_template has no `{{}}` page placeholder: {}",
                self.base_url_template
            )));
        }
        if self.cheapest_limit == 0 {
            return Err(ConfigError::Invalid("cheapest_limit must be > 0".into()));
        }
        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()
}

/// Loads `path` when it exists, otherwise falls back to the built-in defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        AppConfig::default().validate()
    }
}
