use crate::error::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use url::Url;

/// Endpoint used when `JUDGY_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1/analyze";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: Url,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let raw = env::var("JUDGY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::builder().with_api_url(&raw).build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct ConfigBuilder {
    api_url: Option<String>,
}

impl ConfigBuilder {
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = Some(url.to_string());
        self
    }

    pub fn build(self) -> Result<Config> {
        let raw = self.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(raw.trim())
            .map_err(|e| AppError::config(format!("Invalid API URL '{}': {}", raw, e)))?;

        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(AppError::config(format!(
                "API URL must use http or https, got '{}'",
                api_url.scheme()
            )));
        }

        Ok(Config { api_url })
    }
}
