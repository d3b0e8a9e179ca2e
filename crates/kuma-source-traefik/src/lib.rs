// # Traefik Desired-State Source
//
// Fetches router definitions from a Traefik instance's API and derives
// the set of HTTPS hostnames to monitor.
//
// ## Behavior
//
// - `GET {base}/api/rawdata`, read-only, no auth
// - Only routers whose entrypoints include `https` contribute hosts
// - Every `` Host(`example.com`) `` matcher in a rule yields a host, so a
//   rule combining two Host matchers yields two entries
// - Hosts are deduplicated and sorted
//
// A network error or malformed payload fails the fetch; the engine
// reports it and the source contributes nothing that run.

use async_trait::async_trait;
use kuma_core::traits::DesiredSource;
use kuma_core::{EntryKind, Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;
use std::time::Duration;

/// Entrypoint name that marks a router as HTTPS-facing
const HTTPS_ENTRYPOINT: &str = "https";

/// HTTP timeout for the rawdata request
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Matcher for `` Host(`example.com`) `` expressions in router rules
fn host_rule_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Host\(`([^`]+)`\)").expect("static regex"))
}

#[derive(Debug, Deserialize)]
struct RawData {
    #[serde(default)]
    routers: HashMap<String, Router>,
}

#[derive(Debug, Deserialize)]
struct Router {
    #[serde(default, rename = "entryPoints")]
    entry_points: Vec<String>,
    #[serde(default)]
    rule: String,
}

/// Desired-state source backed by one Traefik instance
pub struct TraefikSource {
    base_url: String,
    group: String,
    client: reqwest::Client,
}

impl TraefikSource {
    /// Create a source for the Traefik API at `base_url`
    pub fn new(base_url: impl Into<String>, group: impl Into<String>) -> Self {
        let base_url = base_url.into();
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

/// Extract HTTPS hostnames from a rawdata payload
fn extract_hosts(data: &RawData) -> Vec<String> {
    let mut hosts = BTreeSet::new();
    for router in data.routers.values() {
        if !router.entry_points.iter().any(|e| e == HTTPS_ENTRYPOINT) {
            continue;
        }
        for capture in host_rule_regex().captures_iter(&router.rule) {
            hosts.insert(capture[1].to_string());
        }
    }
    hosts.into_iter().collect()
}

#[async_trait]
impl DesiredSource for TraefikSource {
    async fn fetch(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/rawdata", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::source(format!("Traefik request failed ({url}): {e}")))?;

        if !response.status().is_success() {
            return Err(Error::source(format!(
                "Traefik returned {} for {url}",
                response.status()
            )));
        }

        let data: RawData = response
            .json()
            .await
            .map_err(|e| Error::source(format!("Malformed Traefik rawdata from {url}: {e}")))?;

        let hosts = extract_hosts(&data);
        tracing::debug!("Traefik {} yielded {} HTTPS hosts", self.base_url, hosts.len());
        Ok(hosts)
    }

    fn kind(&self) -> EntryKind {
        EntryKind::Http
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn source_url(&self) -> &str {
        &self.base_url
    }
}
