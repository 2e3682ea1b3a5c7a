use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::request::{DEFAULT_IP_HEADERS, DEFAULT_REFERRER_HEADER};

/// Classifier configuration.
///
/// ```yaml
/// regexes_dir: /etc/ua-classifier/regexes   # omit to use the built-in rules
/// ip_headers: [X-Real-IP, X-Forwarded-For]
/// referrer_header: Referer
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Directory holding `oss.yml`, `os_versions.yml`, `browsers.yml`,
    /// `device_types.yml` and `device_brands.yml`.
    pub regexes_dir: Option<PathBuf>,
    /// Headers checked for the client address, highest priority first.
    pub ip_headers: Vec<String>,
    pub referrer_header: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            regexes_dir: None,
            ip_headers: DEFAULT_IP_HEADERS.iter().map(|h| h.to_string()).collect(),
            referrer_header: DEFAULT_REFERRER_HEADER.to_string(),
        }
    }
}

impl ParserConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
