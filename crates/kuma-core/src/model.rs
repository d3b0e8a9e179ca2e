//! Data model for the monitor sync tool
//!
//! Desired state is derived fresh each run from live Traefik/Docker
//! queries; existing state is a snapshot of the monitor service taken
//! once at the start of a run. Nothing here is persisted by this tool.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Fixed check interval for created HTTP monitors (seconds)
pub const HTTP_CHECK_INTERVAL_SECS: u64 = 60;
/// Fixed retry interval for created HTTP monitors (seconds)
pub const HTTP_RETRY_INTERVAL_SECS: u64 = 60;
/// Fixed retry budget for created HTTP monitors
pub const HTTP_MAX_RETRIES: u32 = 0;
/// Fixed request timeout for created HTTP monitors (seconds)
pub const HTTP_TIMEOUT_SECS: u64 = 48;
/// Fixed redirect budget for created HTTP monitors
pub const HTTP_MAX_REDIRECTS: u32 = 10;
/// Accepted status range for created HTTP monitors
pub const HTTP_ACCEPTED_STATUS: &str = "200-299";

/// Monitor identifier in the monitor service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitorId(pub i64);

/// Tag identifier in the monitor service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagId(pub i64);

/// Docker host registration identifier in the monitor service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DockerHostId(pub i64);

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for DockerHostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of monitored endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// HTTPS host behind a Traefik router
    Http,
    /// Running container on a Docker host
    Docker,
}

impl EntryKind {
    /// Name of the category tag applied to every managed monitor of this kind
    pub fn category_tag(&self) -> &'static str {
        match self {
            EntryKind::Http => "traefik",
            EntryKind::Docker => "docker",
        }
    }
}

/// One entry of the desired state, derived from a live source query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredEntry {
    /// Kind of monitor this entry should map to
    pub kind: EntryKind,
    /// Hostname (HTTP) or container name (Docker)
    pub name: String,
    /// User-defined group label, applied as a tag
    pub group: String,
    /// Base URL of the source this entry was fetched from
    pub source_url: String,
}

/// Snapshot of one monitor as it exists in the monitor service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingMonitor {
    pub id: MonitorId,
    /// Monitor name (hostname for HTTP, container name for Docker)
    pub name: String,
    pub kind: EntryKind,
    /// Docker host the monitor is bound to (Docker kind only)
    pub docker_host: Option<DockerHostId>,
    /// Tags currently attached to the monitor
    pub tag_ids: HashSet<TagId>,
}

/// A tag in the monitor service; names are unique within the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// A Docker host registration in the monitor service
///
/// Docker monitors can only be created against a host that the operator
/// has already registered under the name `{group}-docker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerHost {
    pub id: DockerHostId,
    pub name: String,
}

/// Creation payload for a new monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSpec {
    pub kind: EntryKind,
    pub name: String,
    /// Target URL (HTTP kind only)
    pub url: Option<String>,
    /// Docker host binding (Docker kind only); `None` when the expected
    /// `{group}-docker` registration was not found
    pub docker_host: Option<DockerHostId>,
}

impl MonitorSpec {
    /// Spec for an HTTP monitor watching `https://{host}`
    pub fn http(host: &str) -> Self {
        Self {
            kind: EntryKind::Http,
            name: host.to_string(),
            url: Some(format!("https://{host}")),
            docker_host: None,
        }
    }

    /// Spec for a Docker container monitor
    pub fn docker(container: &str, host: Option<DockerHostId>) -> Self {
        Self {
            kind: EntryKind::Docker,
            name: container.to_string(),
            url: None,
            docker_host: host,
        }
    }
}
