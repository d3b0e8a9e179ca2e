// # Desired Source Trait
//
// Defines the interface for fetching desired-state name listings.
//
// ## Implementations
//
// - Traefik HTTPS hosts: `kuma-source-traefik` crate
// - Docker running containers: `kuma-source-docker` crate
//
// Sources are read-only and stateless: one HTTP listing per `fetch`
// call, no caching, no retries. A failed fetch is reported by the
// engine and that source simply contributes nothing to the run.

use crate::error::Result;
use crate::model::{DesiredEntry, EntryKind};
use async_trait::async_trait;

/// Trait for desired-state source implementations
#[async_trait]
pub trait DesiredSource: Send + Sync {
    /// Fetch the current name listing, deduplicated and sorted
    async fn fetch(&self) -> Result<Vec<String>>;

    /// Kind of monitor this source's entries map to
    fn kind(&self) -> EntryKind;

    /// Group label applied as a tag to this source's monitors
    fn group(&self) -> &str;

    /// Base URL of the upstream API (for logging)
    fn source_url(&self) -> &str;
}

impl dyn DesiredSource + '_ {
    /// Turn fetched names into desired entries for this source
    pub fn entries(&self, names: Vec<String>) -> Vec<DesiredEntry> {
        names
            .into_iter()
            .map(|name| DesiredEntry {
                kind: self.kind(),
                name,
                group: self.group().to_string(),
                source_url: self.source_url().to_string(),
            })
            .collect()
    }
}
