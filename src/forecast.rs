//! Handle for the external forecasting service.
//!
//! Only the credential bootstrap lives here; no requests are issued.

use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{CalibratorError, Result};

pub const API_KEY_ENV: &str = "NIXTLA_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.nixtla.io";

#[derive(Clone)]
pub struct ForecastClient {
    api_key: String,
    base_url: String,
}

impl ForecastClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: DEFAULT_BASE_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read the key from the environment, loading a local `.env` first if present.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) => debug!(error = %e, "no .env loaded"),
        }
        Self::from_env_var(API_KEY_ENV)
    }

    pub fn from_env_var(var: &str) -> Result<Self> {
        let key = std::env::var(var).map_err(|_| CalibratorError::MissingApiKey(var.to_string()))?;
        if key.trim().is_empty() {
            return Err(CalibratorError::MissingApiKey(var.to_string()));
        }
        Ok(Self::new(key.trim()))
    }

    /// Key from the process environment, else from the given dotenv file.
    /// The file is read without touching the process environment.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Ok(client) = Self::from_env_var(API_KEY_ENV) {
            return Ok(client);
        }
        for item in dotenvy::from_path_iter(path.as_ref())? {
            let (key, value) = item?;
            if key == API_KEY_ENV && !value.trim().is_empty() {
                debug!(path = %path.as_ref().display(), "api key read from dotenv file");
                return Ok(Self::new(value.trim()));
            }
        }
        Err(CalibratorError::MissingApiKey(API_KEY_ENV.to_string()))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for ForecastClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
