// # Docker Desired-State Source
//
// Fetches the running-container listing from a Docker Engine API and
// derives the set of container names to monitor.
//
// ## Behavior
//
// - `GET {base}/containers/json` (running containers only), read-only
// - `tcp://host:port` base URLs are rewritten to `http://host:port`
// - The engine reports names with a leading `/`, which is stripped
// - Names are deduplicated and sorted
//
// Failure policy matches the Traefik source: a failed fetch empties this
// source's contribution for the run, nothing more.

use async_trait::async_trait;
use kuma_core::traits::DesiredSource;
use kuma_core::{EntryKind, Error, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

/// HTTP timeout for the container-listing request
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ContainerSummary {
    #[serde(default, rename = "Names")]
    names: Vec<String>,
}

/// Desired-state source backed by one Docker host
pub struct DockerSource {
    base_url: String,
    group: String,
    client: reqwest::Client,
}

impl DockerSource {
    /// Create a source for the Docker Engine API at `base_url`
    ///
    /// Accepts `tcp://` URLs as configured for Docker remotes and
    /// rewrites them to `http://` for the request.
    pub fn new(base_url: impl Into<String>, group: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url
            .strip_prefix("tcp://")
            .map(|rest| format!("http://{rest}"))
            .unwrap_or(base_url);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            group: group.into(),
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

/// Extract container names from a listing payload
fn extract_names(containers: &[ContainerSummary]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for container in containers {
        if let Some(name) = container.names.first() {
            names.insert(name.trim_start_matches('/').to_string());
        }
    }
    names.into_iter().collect()
}

#[async_trait]
impl DesiredSource for DockerSource {
    async fn fetch(&self) -> Result<Vec<String>> {
        let url = format!("{}/containers/json", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::source(format!("Docker request failed ({url}): {e}")))?;

        if !response.status().is_success() {
            return Err(Error::source(format!(
                "Docker returned {} for {url}",
                response.status()
            )));
        }

        let containers: Vec<ContainerSummary> = response
            .json()
            .await
            .map_err(|e| Error::source(format!("Malformed Docker listing from {url}: {e}")))?;

        let names = extract_names(&containers);
        tracing::debug!(
            "Docker {} yielded {} running containers",
            self.base_url,
            names.len()
        );
        Ok(names)
    }

    fn kind(&self) -> EntryKind {
        EntryKind::Docker
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn source_url(&self) -> &str {
        &self.base_url
    }
}
