//! # Runtime Configuration Module
//!
//! Dispatch settings loaded from environment variables or a YAML file.
//!
//! ## Environment Variables
//!
//! ### `RESTD_DEFAULT_FORMAT`
//!
//! Output format used when the route carries no format hint. Must be a
//! lower-case identifier such as `json` or `xml`.
//!
//! Default: `json`
//!
//! ### `RESTD_METHOD_OVERRIDE_HEADER`
//!
//! Header consulted for method overrides.
//!
//! Default: `x-http-method-override`
//!
//! ### `RESTD_VIEWS_DIR`
//!
//! Directory holding `*.html` views for the `html` format. Unset means only
//! the built-in error page is available.
//!
//! ## YAML
//!
//! ```yaml
//! default_format: xml
//! override_header: x-method
//! views_dir: ./views
//! ```
//!
//! Missing fields take their defaults.
//!
//! ## Usage
//!
//! ```rust
//! use restdispatch::runtime_config::RestConfig;
//!
//! let config = RestConfig::from_env();
//! println!("Default format: {}", config.default_format);
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::method::DEFAULT_OVERRIDE_HEADER;

/// Format used when neither the route nor the configuration names one.
pub const DEFAULT_FORMAT: &str = "json";

/// Dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Output format when the route has no format hint (default: `json`)
    pub default_format: String,
    /// Method override header name (default: `x-http-method-override`)
    pub override_header: String,
    /// Views directory for HTML output
    pub views_dir: Option<PathBuf>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            default_format: DEFAULT_FORMAT.to_string(),
            override_header: DEFAULT_OVERRIDE_HEADER.to_string(),
            views_dir: None,
        }
    }
}

impl RestConfig {
    /// Load configuration from environment variables.
    ///
    /// An invalid `RESTD_DEFAULT_FORMAT` is logged and replaced by the default.
    pub fn from_env() -> Self {
        let default_format = match env::var("RESTD_DEFAULT_FORMAT") {
            Ok(val) if is_format_identifier(&val) => val,
            Ok(val) => {
                warn!(value = %val, "Invalid RESTD_DEFAULT_FORMAT - using default");
                DEFAULT_FORMAT.to_string()
            }
            Err(_) => DEFAULT_FORMAT.to_string(),
        };
        let override_header = env::var("RESTD_METHOD_OVERRIDE_HEADER")
            .ok()
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_OVERRIDE_HEADER.to_string());
        let views_dir = env::var("RESTD_VIEWS_DIR")
            .ok()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);

        RestConfig {
            default_format,
            override_header,
            views_dir,
        }
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Unreadable file, invalid YAML, or a format that is not a lower-case
    /// identifier.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Invalid YAML or an invalid `default_format`.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: RestConfig = serde_yaml::from_str(text)?;
        config.override_header = config.override_header.to_ascii_lowercase();
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `default_format` is not a lower-case identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_format_identifier(&self.default_format) {
            Ok(())
        } else {
            Err(ConfigError::InvalidFormat(self.default_format.clone()))
        }
    }
}

fn is_format_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}
