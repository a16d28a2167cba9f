//! kgflow config - serde structs for ~/.kgflow/config.json
//!
//! Pure types and parsing only. Missing or unreadable files fall back to
//! defaults; environment variables override the file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{Credentials, CREDENTIALS_NAME, DEFAULT_BASE_URL};

pub const ENV_BASE_URL: &str = "KGFLOW_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "KGFLOW_TIMEOUT_SECS";

/// Endpoint used to validate credentials. Older manifests probed the
/// episodes listing instead of the health endpoint; both remain available.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityProbe {
    #[default]
    Healthcheck,
    Episodes,
}

impl ConnectivityProbe {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Healthcheck => "/healthcheck",
            Self::Episodes => "/episodes/",
        }
    }
}

impl std::str::FromStr for ConnectivityProbe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "healthcheck" => Ok(Self::Healthcheck),
            "episodes" => Ok(Self::Episodes),
            other => Err(Error::ConfigError(format!("unknown probe: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KgflowConfig {
    /// Credential sets keyed by credential name.
    pub credentials: BTreeMap<String, Credentials>,
    pub probe: ConnectivityProbe,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
    #[serde(rename = "workflowId")]
    pub workflow_id: String,
    #[serde(rename = "executionId")]
    pub execution_id: Option<String>,
}

impl Default for KgflowConfig {
    fn default() -> Self {
        let mut credentials = BTreeMap::new();
        credentials.insert(CREDENTIALS_NAME.to_string(), Credentials::new(DEFAULT_BASE_URL));
        Self {
            credentials,
            probe: ConnectivityProbe::default(),
            timeout_secs: None,
            workflow_id: "kgflow".to_string(),
            execution_id: None,
        }
    }
}

impl KgflowConfig {
    /// Load from a specific path. A missing file yields defaults; a file
    /// that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Discover from ~/.kgflow/config.json and apply env overrides.
    pub fn discover() -> Result<Self> {
        let mut config = Self::load(&Self::default_path())?;
        config.apply_env();
        Ok(config)
    }

    /// Default path: ~/.kgflow/config.json
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".kgflow")
            .join("config.json")
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_BASE_URL).ok(),
            std::env::var(ENV_TIMEOUT_SECS).ok(),
        );
    }

    fn apply_overrides(&mut self, base_url: Option<String>, timeout: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.credentials
                .insert(CREDENTIALS_NAME.to_string(), Credentials::new(url));
        }
        if let Some(raw) = timeout {
            match raw.parse() {
                Ok(secs) => self.timeout_secs = Some(secs),
                Err(_) => tracing::warn!("ignoring {}={}: not a number", ENV_TIMEOUT_SECS, raw),
            }
        }
    }

    pub fn credentials(&self, name: &str) -> Option<&Credentials> {
        self.credentials.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_local_credentials() {
        let c = KgflowConfig::default();
        assert_eq!(
            c.credentials(CREDENTIALS_NAME).map(|c| c.base_url.as_str()),
            Some(DEFAULT_BASE_URL)
        );
        assert_eq!(c.probe, ConnectivityProbe::Healthcheck);
    }

    #[test]
    fn overrides_replace_base_url() {
        let mut c = KgflowConfig::default();
        c.apply_overrides(Some("http://graphiti:5000".into()), Some("30".into()));
        assert_eq!(c.credentials[CREDENTIALS_NAME].base_url, "http://graphiti:5000");
        assert_eq!(c.timeout_secs, Some(30));
    }

    #[test]
    fn blank_override_is_ignored() {
        let mut c = KgflowConfig::default();
        c.apply_overrides(Some("  ".into()), Some("soon".into()));
        assert_eq!(c.credentials[CREDENTIALS_NAME].base_url, DEFAULT_BASE_URL);
        assert_eq!(c.timeout_secs, None);
    }

    #[test]
    fn probe_paths() {
        assert_eq!(ConnectivityProbe::Healthcheck.path(), "/healthcheck");
        assert_eq!(ConnectivityProbe::Episodes.path(), "/episodes/");
        assert_eq!("episodes".parse::<ConnectivityProbe>().unwrap(), ConnectivityProbe::Episodes);
        assert!("ping".parse::<ConnectivityProbe>().is_err());
    }
}
