//! Test doubles and common utilities for architecture contract tests
//!
//! This module provides an in-memory monitor service and scripted
//! desired-state sources that verify architectural constraints without
//! any network I/O.

use kuma_core::config::{KumaConfig, SourceConfig, SyncConfig};
use kuma_core::error::{Error, Result};
use kuma_core::model::{
    DockerHost, DockerHostId, EntryKind, ExistingMonitor, MonitorId, MonitorSpec, Tag, TagId,
};
use kuma_core::traits::{DesiredSource, MonitorService};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared in-memory state behind [`MockMonitorService`]
#[derive(Default)]
pub struct ServiceState {
    pub monitors: Vec<ExistingMonitor>,
    pub tags: Vec<Tag>,
    pub docker_hosts: Vec<DockerHost>,
    next_monitor_id: i64,
    next_tag_id: i64,
}

impl ServiceState {
    fn next_monitor_id(&mut self) -> MonitorId {
        self.next_monitor_id += 1;
        MonitorId(self.next_monitor_id)
    }

    fn next_tag_id(&mut self) -> TagId {
        self.next_tag_id += 1;
        TagId(self.next_tag_id)
    }
}

/// An in-memory MonitorService that tracks calls
///
/// State lives behind an `Arc` so a test can keep its own handle while
/// the engine owns the service, and so two engine instances can operate
/// on the same service state across simulated runs.
pub struct MockMonitorService {
    state: Arc<Mutex<ServiceState>>,
    /// Call counter for login()
    login_count: Arc<AtomicUsize>,
    /// Counter for every state-changing call (creates, deletes, tag ops)
    write_count: Arc<AtomicUsize>,
    /// Call counter for tags()
    tags_count: Arc<AtomicUsize>,
    /// When set, the next non-login call fails with SessionExpired
    expire_next: Arc<AtomicBool>,
    /// When set, the next tags() call returns an empty listing
    hide_tags_next: Arc<AtomicBool>,
}

impl MockMonitorService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ServiceState::default())),
            login_count: Arc::new(AtomicUsize::new(0)),
            write_count: Arc::new(AtomicUsize::new(0)),
            tags_count: Arc::new(AtomicUsize::new(0)),
            expire_next: Arc::new(AtomicBool::new(false)),
            hide_tags_next: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a new MockMonitorService that shares state and counters
    /// with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            state: Arc::clone(&other.state),
            login_count: Arc::clone(&other.login_count),
            write_count: Arc::clone(&other.write_count),
            tags_count: Arc::clone(&other.tags_count),
            expire_next: Arc::clone(&other.expire_next),
            hide_tags_next: Arc::clone(&other.hide_tags_next),
        }
    }

    /// Get the number of times login() was called
    pub fn login_count(&self) -> usize {
        self.login_count.load(Ordering::SeqCst)
    }

    /// Get the number of state-changing calls made so far
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Get the number of times tags() was called
    pub fn tags_count(&self) -> usize {
        self.tags_count.load(Ordering::SeqCst)
    }

    /// Make the next non-login call fail with SessionExpired
    pub fn expire_session(&self) {
        self.expire_next.store(true, Ordering::SeqCst);
    }

    /// Make the next tags() call return an empty listing
    ///
    /// Simulates the lost race where a tag is created between the
    /// listing and the create attempt.
    pub fn hide_tags_once(&self) {
        self.hide_tags_next.store(true, Ordering::SeqCst);
    }

    /// Register a Docker host the way an operator would in the service UI
    pub fn register_docker_host(&self, name: &str) -> DockerHostId {
        let mut state = self.state.lock().unwrap();
        let id = DockerHostId(state.docker_hosts.len() as i64 + 1);
        state.docker_hosts.push(DockerHost {
            id,
            name: name.to_string(),
        });
        id
    }

    /// Seed an existing monitor directly into the service state
    pub fn seed_monitor(
        &self,
        name: &str,
        kind: EntryKind,
        docker_host: Option<DockerHostId>,
        tag_ids: HashSet<TagId>,
    ) -> MonitorId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_monitor_id();
        state.monitors.push(ExistingMonitor {
            id,
            name: name.to_string(),
            kind,
            docker_host,
            tag_ids,
        });
        id
    }

    /// Seed a tag directly into the service state
    pub fn seed_tag(&self, name: &str) -> TagId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_tag_id();
        state.tags.push(Tag {
            id,
            name: name.to_string(),
        });
        id
    }

    /// Snapshot of the current monitors, for assertions
    pub fn monitors_snapshot(&self) -> Vec<ExistingMonitor> {
        self.state.lock().unwrap().monitors.clone()
    }

    /// Look up a tag id by name, for assertions
    pub fn tag_id(&self, name: &str) -> Option<TagId> {
        self.state
            .lock()
            .unwrap()
            .tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.id)
    }

    fn check_session(&self) -> Result<()> {
        if self.expire_next.swap(false, Ordering::SeqCst) {
            return Err(Error::session_expired("token rejected"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MonitorService for MockMonitorService {
    async fn login(&self, _username: &str, _password: &str) -> Result<()> {
        self.login_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn monitors(&self) -> Result<Vec<ExistingMonitor>> {
        self.check_session()?;
        Ok(self.state.lock().unwrap().monitors.clone())
    }

    async fn create_monitor(&self, spec: &MonitorSpec) -> Result<MonitorId> {
        self.check_session()?;
        self.write_count.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let id = state.next_monitor_id();
        state.monitors.push(ExistingMonitor {
            id,
            name: spec.name.clone(),
            kind: spec.kind,
            docker_host: spec.docker_host,
            tag_ids: HashSet::new(),
        });
        Ok(id)
    }

    async fn delete_monitor(&self, id: MonitorId) -> Result<()> {
        self.check_session()?;
        self.write_count.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let before = state.monitors.len();
        state.monitors.retain(|m| m.id != id);
        if state.monitors.len() == before {
            return Err(Error::not_found(format!("monitor {id}")));
        }
        Ok(())
    }

    async fn add_monitor_tag(&self, monitor: MonitorId, tag: TagId) -> Result<()> {
        self.check_session()?;
        self.write_count.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let m = state
            .monitors
            .iter_mut()
            .find(|m| m.id == monitor)
            .ok_or_else(|| Error::not_found(format!("monitor {monitor}")))?;
        m.tag_ids.insert(tag);
        Ok(())
    }

    async fn remove_monitor_tag(&self, monitor: MonitorId, tag: TagId) -> Result<()> {
        self.check_session()?;
        self.write_count.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let m = state
            .monitors
            .iter_mut()
            .find(|m| m.id == monitor)
            .ok_or_else(|| Error::not_found(format!("monitor {monitor}")))?;
        m.tag_ids.remove(&tag);
        Ok(())
    }

    async fn tags(&self) -> Result<Vec<Tag>> {
        self.check_session()?;
        self.tags_count.fetch_add(1, Ordering::SeqCst);
        if self.hide_tags_next.swap(false, Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(self.state.lock().unwrap().tags.clone())
    }

    async fn create_tag(&self, name: &str) -> Result<Tag> {
        self.check_session()?;
        self.write_count.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.tags.iter().any(|t| t.name == name) {
            return Err(Error::service(format!("tag '{name}' already exists")));
        }
        let id = state.next_tag_id();
        let tag = Tag {
            id,
            name: name.to_string(),
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn docker_hosts(&self) -> Result<Vec<DockerHost>> {
        self.check_session()?;
        Ok(self.state.lock().unwrap().docker_hosts.clone())
    }
}

/// A source returning a fixed name listing
pub struct StaticSource {
    names: Vec<String>,
    kind: EntryKind,
    group: String,
    url: String,
}

impl StaticSource {
    pub fn http(group: &str, names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            kind: EntryKind::Http,
            group: group.to_string(),
            url: "http://traefik.test:8080".to_string(),
        }
    }

    pub fn docker(group: &str, names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            kind: EntryKind::Docker,
            group: group.to_string(),
            url: "http://docker.test:2375".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl DesiredSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<String>> {
        Ok(self.names.clone())
    }

    fn kind(&self) -> EntryKind {
        self.kind
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn source_url(&self) -> &str {
        &self.url
    }
}

/// A source whose fetch always fails
pub struct FailingSource {
    group: String,
}

impl FailingSource {
    pub fn new(group: &str) -> Self {
        Self {
            group: group.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl DesiredSource for FailingSource {
    async fn fetch(&self) -> Result<Vec<String>> {
        Err(Error::source("connection refused"))
    }

    fn kind(&self) -> EntryKind {
        EntryKind::Http
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn source_url(&self) -> &str {
        "http://unreachable.test:8080"
    }
}

/// Helper to create a minimal SyncConfig for testing
///
/// The write delay is zeroed so tests do not sleep.
pub fn test_config() -> SyncConfig {
    SyncConfig {
        kuma: KumaConfig {
            url: "https://uptime.test".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
        },
        traefik: vec![SourceConfig {
            url: "http://traefik.test:8080".to_string(),
            group: "edge".to_string(),
        }],
        docker: Vec::new(),
        ignore_patterns: Vec::new(),
        reset_tags: false,
        write_delay_ms: 0,
    }
}
