//! Configuration data models
//!
//! This module defines the data structures used for application configuration.
//! Every section is `#[serde(default)]` so a config file written by an older
//! version (or edited by hand) only needs the keys it wants to override.

use crate::error::{AnalyzerError, Result, StringError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default analysis server origin
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Analysis server connection settings
    pub server: ServerSettings,
    /// Report page settings
    pub page: PageSettings,
}

/// Analysis server connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Origin of the analysis server, e.g. `http://127.0.0.1:5000`
    pub base_url: String,
    /// Per-request timeout in seconds; `None` keeps the HTTP client default
    pub request_timeout_secs: Option<u64>,
    /// User agent sent with every request
    pub user_agent: String,
}

/// What to do with a container whose fragment is missing from an analysis reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentFragmentPolicy {
    /// Leave the container's previous content in place
    #[default]
    Preserve,
    /// Empty the container
    Clear,
}

/// Report page settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    /// Where the console host writes the rendered report page
    pub report_path: PathBuf,
    /// Handling of fragments missing from an otherwise non-empty analysis reply
    pub absent_fragment_policy: AbsentFragmentPolicy,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            user_agent: format!("talukscope/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from("talukscope-report.html"),
            absent_fragment_policy: AbsentFragmentPolicy::Preserve,
        }
    }
}

impl ServerSettings {
    /// Validated base URL with surrounding whitespace and trailing slashes removed
    pub fn normalized_base_url(&self) -> Result<String> {
        normalize_base_url(&self.base_url)
    }
}

/// Validate and normalize an analysis server origin
///
/// Accepts only `http://` and `https://` URLs with a non-empty host part.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');

    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| {
            AnalyzerError::ConfigError(StringError::new(format!(
                "base_url must start with http:// or https://, got '{raw}'"
            )))
        })?;

    if rest.is_empty() {
        return Err(AnalyzerError::ConfigError(StringError::new(format!(
            "base_url has no host: '{raw}'"
        ))));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.server.request_timeout_secs, None);
        assert_eq!(
            config.page.absent_fragment_policy,
            AbsentFragmentPolicy::Preserve
        );
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "server": { "base_url": "http://analysis.local:8080" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.base_url, "http://analysis.local:8080");
        assert!(config.server.user_agent.starts_with("talukscope/"));
        assert_eq!(config.page, PageSettings::default());
    }

    #[test]
    fn test_policy_serialization() {
        let json = r#"{ "page": { "absent_fragment_policy": "clear" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.page.absent_fragment_policy, AbsentFragmentPolicy::Clear);
    }

    #[test]
    fn test_normalize_base_url_trims_trailing_slash() {
        assert_eq!(
            normalize_base_url(" http://127.0.0.1:5000/ ").unwrap(),
            "http://127.0.0.1:5000"
        );
        assert_eq!(
            normalize_base_url("https://example.org/api//").unwrap(),
            "https://example.org/api"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_bad_values() {
        assert!(normalize_base_url("127.0.0.1:5000").is_err());
        assert!(normalize_base_url("ftp://example.org").is_err());
        assert!(normalize_base_url("http://").is_err());
        assert!(normalize_base_url("").is_err());
    }
}
