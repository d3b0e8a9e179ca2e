//! Configuration types for the monitor sync tool
//!
//! The configuration is assembled once at startup (environment variables
//! plus command-line overrides, see the `kuma-sync` binary) and passed by
//! reference into the engine. There is no ambient global state.

use serde::{Deserialize, Serialize};

/// Default pause between consecutive state-changing calls (milliseconds)
///
/// A simple fixed sleep to bound the request rate against the monitor
/// service, not an adaptive backoff.
pub const DEFAULT_WRITE_DELAY_MS: u64 = 200;

/// Main sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Monitor service connection settings
    pub kuma: KumaConfig,

    /// Traefik instances to derive HTTPS-host monitors from
    #[serde(default)]
    pub traefik: Vec<SourceConfig>,

    /// Docker hosts to derive container monitors from
    #[serde(default)]
    pub docker: Vec<SourceConfig>,

    /// Wildcard patterns excluding names from creation and marking
    /// existing monitors for deletion
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Reset mode: strip all tags from matched monitors and re-apply
    /// exactly the category and group tags
    #[serde(default)]
    pub reset_tags: bool,

    /// Pause between consecutive state-changing calls (milliseconds)
    #[serde(default = "default_write_delay_ms")]
    pub write_delay_ms: u64,
}

impl SyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.kuma.validate()?;

        if self.traefik.is_empty() && self.docker.is_empty() {
            return Err(crate::Error::config(
                "At least one Traefik or Docker source must be configured",
            ));
        }

        for source in self.traefik.iter().chain(&self.docker) {
            source.validate()?;
        }

        Ok(())
    }
}

/// Monitor service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KumaConfig {
    /// Base URL of the monitor service
    pub url: String,

    /// Login username; API-key auth is unsupported
    pub username: String,

    /// Login password
    pub password: String,
}

impl KumaConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("Monitor service URL cannot be empty"));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "Monitor service URL must use http or https: {}",
                self.url
            )));
        }
        if self.username.is_empty() {
            return Err(crate::Error::config("Monitor service username cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(crate::Error::config("Monitor service password cannot be empty"));
        }
        Ok(())
    }
}

/// One desired-state source (a Traefik instance or a Docker host)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the upstream API
    pub url: String,

    /// Group label applied as a tag; for Docker sources, also selects the
    /// `{group}-docker` host registration in the monitor service
    pub group: String,
}

impl SourceConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("Source URL cannot be empty"));
        }
        if self.group.is_empty() {
            return Err(crate::Error::config(format!(
                "Source {} has an empty group label",
                self.url
            )));
        }
        Ok(())
    }
}

fn default_write_delay_ms() -> u64 {
    DEFAULT_WRITE_DELAY_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> SyncConfig {
        SyncConfig {
            kuma: KumaConfig {
                url: "https://uptime.example.com".to_string(),
                username: "admin".to_string(),
                password: "secret".to_string(),
            },
            traefik: vec![SourceConfig {
                url: "http://traefik:8080".to_string(),
                group: "edge".to_string(),
            }],
            docker: Vec::new(),
            ignore_patterns: Vec::new(),
            reset_tags: false,
            write_delay_ms: DEFAULT_WRITE_DELAY_MS,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn requires_at_least_one_source() {
        let mut config = base_config();
        config.traefik.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_http_service_url() {
        let mut config = base_config();
        config.kuma.url = "ws://uptime.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_group() {
        let mut config = base_config();
        config.traefik[0].group.clear();
        assert!(config.validate().is_err());
    }
}
