//! Core sync engine
//!
//! The SyncEngine is responsible for:
//! - Fetching the existing-monitor snapshot once per run
//! - Driving each configured source through the three reconciliation passes
//! - Applying planned actions with the run's error policy
//!
//! ## Control flow
//!
//! ```text
//! ┌───────────────┐   ┌───────────────┐
//! │ TraefikSource │   │ DockerSource  │      (one fetch per source)
//! └───────┬───────┘   └───────┬───────┘
//!         └──── desired ──────┘
//!                  │
//!          ┌───────▼────────┐   plan_source()   ┌──────────────┐
//!          │   SyncEngine   │──────────────────▶│ Action list  │
//!          └───────┬────────┘                   └──────┬───────┘
//!                  │              apply                │
//!          ┌───────▼──────────────────────────────────▼┐
//!          │ Session<MonitorService>  (re-auth + retry) │
//!          └────────────────────────────────────────────┘
//! ```
//!
//! Sources are processed strictly sequentially in configured order; every
//! state-changing call is followed by a fixed pacing delay. Per-item
//! failures are logged and counted but never abort the run; only the
//! initial connect/login is fatal.

use crate::config::SyncConfig;
use crate::error::Result;
use crate::filter::IgnorePatterns;
use crate::model::{DockerHostId, EntryKind, ExistingMonitor};
use crate::reconcile::{Action, RequiredTags, SourceScope, TagMode, plan_source};
use crate::session::Session;
use crate::tags::TagResolver;
use crate::traits::{DesiredSource, MonitorService};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Monitors created
    pub created: usize,
    /// Monitors whose tags were corrected
    pub tags_updated: usize,
    /// Monitors deleted by the cleanup pass
    pub deleted: usize,
    /// Individual actions that failed and were skipped
    pub failed: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {}, tags corrected {}, deleted {}, failed {}",
            self.created, self.tags_updated, self.deleted, self.failed
        )
    }
}

/// Core sync engine
///
/// Owns the authenticated session, the configured sources, and the run
/// policy (ignore patterns, tag mode, pacing delay). Single logical
/// thread of control: all remote calls are sequential, the only shared
/// mutable state is the in-run tag cache and the monitor snapshot, both
/// confined to one run.
pub struct SyncEngine<S> {
    session: Session<S>,
    sources: Vec<Box<dyn DesiredSource>>,
    ignore: IgnorePatterns,
    mode: TagMode,
    write_delay: Duration,
}

impl<S: MonitorService> SyncEngine<S> {
    /// Create a new engine from a validated configuration
    pub fn new(
        session: Session<S>,
        sources: Vec<Box<dyn DesiredSource>>,
        config: &SyncConfig,
    ) -> Result<Self> {
        config.validate()?;
        let ignore = IgnorePatterns::compile(&config.ignore_patterns)?;
        let mode = if config.reset_tags {
            TagMode::Reset
        } else {
            TagMode::Normal
        };

        Ok(Self {
            session,
            sources,
            ignore,
            mode,
            write_delay: Duration::from_millis(config.write_delay_ms),
        })
    }

    /// Run one reconciliation pass over all configured sources
    pub async fn run(&self) -> Result<SyncReport> {
        let mut monitors = self.session.invoke(|s| Box::pin(s.monitors())).await?;
        info!("Found {} existing monitors", monitors.len());

        if !self.ignore.is_empty() {
            info!(
                "Ignore patterns configured: {}",
                self.ignore.as_strings().join(", ")
            );
        }
        if self.mode == TagMode::Reset {
            info!("Reset mode enabled: stray tags will be stripped");
        }

        let mut resolver = TagResolver::new();
        let mut report = SyncReport::default();

        for source in &self.sources {
            self.sync_source(source.as_ref(), &mut monitors, &mut resolver, &mut report)
                .await;
        }

        info!("Sync complete: {}", report);
        Ok(report)
    }

    /// Reconcile one source; never fails the run
    async fn sync_source(
        &self,
        source: &dyn DesiredSource,
        monitors: &mut Vec<ExistingMonitor>,
        resolver: &mut TagResolver,
        report: &mut SyncReport,
    ) {
        info!(
            "Processing {} source {} (group '{}')",
            source.kind().category_tag(),
            source.source_url(),
            source.group()
        );

        let names = match source.fetch().await {
            Ok(names) => names,
            Err(e) => {
                warn!(
                    "Skipping source {}: {} (its contribution is empty this run)",
                    source.source_url(),
                    e
                );
                return;
            }
        };
        info!("Found {} desired names", names.len());
        let desired = source.entries(names);

        let category = match resolver
            .get_or_create(&self.session, source.kind().category_tag())
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!(
                    "Could not resolve '{}' tag: {}; skipping source {}",
                    source.kind().category_tag(),
                    e,
                    source.source_url()
                );
                report.failed += 1;
                return;
            }
        };
        let group = match resolver.get_or_create(&self.session, source.group()).await {
            Ok(id) => id,
            Err(e) => {
                error!(
                    "Could not resolve group tag '{}': {}; skipping source {}",
                    source.group(),
                    e,
                    source.source_url()
                );
                report.failed += 1;
                return;
            }
        };
        let required = RequiredTags { category, group };

        let scope = match source.kind() {
            EntryKind::Http => SourceScope::http(),
            EntryKind::Docker => {
                SourceScope::docker(self.resolve_docker_host(source.group()).await)
            }
        };

        let actions = plan_source(&desired, monitors, &self.ignore, &required, self.mode, scope);
        if actions.is_empty() {
            info!("Source already converged, nothing to do");
            return;
        }
        debug!("Planned {} action(s)", actions.len());

        for action in actions {
            self.apply(action, &required, monitors, report).await;
        }
    }

    /// Look up the `{group}-docker` host registration
    async fn resolve_docker_host(&self, group: &str) -> Option<DockerHostId> {
        let wanted = format!("{group}-docker");
        match self.session.invoke(|s| Box::pin(s.docker_hosts())).await {
            Ok(hosts) => {
                let id = hosts.into_iter().find(|h| h.name == wanted).map(|h| h.id);
                if id.is_none() {
                    warn!(
                        "Docker host '{}' is not registered in the monitor service \
                         (Settings → Docker Hosts); creations for this source will fail",
                        wanted
                    );
                }
                id
            }
            Err(e) => {
                warn!("Could not list Docker hosts: {}", e);
                None
            }
        }
    }

    /// Apply one action; errors are logged and counted, never propagated
    async fn apply(
        &self,
        action: Action,
        required: &RequiredTags,
        monitors: &mut Vec<ExistingMonitor>,
        report: &mut SyncReport,
    ) {
        match action {
            Action::Delete { id, name } => {
                match self.session.invoke(|s| Box::pin(s.delete_monitor(id))).await {
                    Ok(()) => {
                        info!("Removed monitor '{}' (id {})", name, id);
                        monitors.retain(|m| m.id != id);
                        report.deleted += 1;
                    }
                    Err(e) => {
                        warn!("Failed to remove monitor '{}' (id {}): {}", name, id, e);
                        report.failed += 1;
                    }
                }
                self.pace().await;
            }

            Action::AddTags { id, name, tags } => {
                let mut added = 0;
                for tag in tags {
                    match self
                        .session
                        .invoke(|s| Box::pin(s.add_monitor_tag(id, tag)))
                        .await
                    {
                        Ok(()) => {
                            if let Some(m) = monitors.iter_mut().find(|m| m.id == id) {
                                m.tag_ids.insert(tag);
                            }
                            added += 1;
                        }
                        Err(e) => {
                            warn!("Could not add tag {} to monitor '{}': {}", tag, name, e);
                            report.failed += 1;
                        }
                    }
                    self.pace().await;
                }
                if added > 0 {
                    info!("Added {} tag(s) to '{}'", added, name);
                    report.tags_updated += 1;
                }
            }

            Action::ResetTags {
                id,
                name,
                remove,
                add,
            } => {
                let removed_count = remove.len();
                for tag in remove {
                    if let Err(e) = self
                        .session
                        .invoke(|s| Box::pin(s.remove_monitor_tag(id, tag)))
                        .await
                    {
                        // Leave the monitor as-is rather than re-tagging a
                        // partially stripped tag set.
                        warn!(
                            "Could not remove tag {} from monitor '{}': {}; reset aborted",
                            tag, name, e
                        );
                        report.failed += 1;
                        self.pace().await;
                        return;
                    }
                    if let Some(m) = monitors.iter_mut().find(|m| m.id == id) {
                        m.tag_ids.remove(&tag);
                    }
                    self.pace().await;
                }

                let mut added = 0;
                for tag in add {
                    match self
                        .session
                        .invoke(|s| Box::pin(s.add_monitor_tag(id, tag)))
                        .await
                    {
                        Ok(()) => {
                            if let Some(m) = monitors.iter_mut().find(|m| m.id == id) {
                                m.tag_ids.insert(tag);
                            }
                            added += 1;
                        }
                        Err(e) => {
                            warn!("Could not add tag {} to monitor '{}': {}", tag, name, e);
                            report.failed += 1;
                        }
                    }
                    self.pace().await;
                }
                info!(
                    "Reset tags for '{}' (removed {}, added {})",
                    name, removed_count, added
                );
                report.tags_updated += 1;
            }

            Action::Create { spec, group } => {
                if spec.kind == EntryKind::Docker && spec.docker_host.is_none() {
                    warn!(
                        "Skipping '{}': Docker host '{}-docker' not found in the monitor service",
                        spec.name, group
                    );
                    report.failed += 1;
                    return;
                }

                match self
                    .session
                    .invoke(|s| Box::pin(s.create_monitor(&spec)))
                    .await
                {
                    Ok(id) => {
                        info!("Created monitor '{}' (id {})", spec.name, id);
                        self.pace().await;

                        let mut tag_ids = HashSet::new();
                        for tag in required.as_vec() {
                            match self
                                .session
                                .invoke(|s| Box::pin(s.add_monitor_tag(id, tag)))
                                .await
                            {
                                Ok(()) => {
                                    tag_ids.insert(tag);
                                }
                                Err(e) => {
                                    warn!(
                                        "Could not tag new monitor '{}' (tag {}): {}",
                                        spec.name, tag, e
                                    );
                                    report.failed += 1;
                                }
                            }
                            self.pace().await;
                        }

                        monitors.push(ExistingMonitor {
                            id,
                            name: spec.name.clone(),
                            kind: spec.kind,
                            docker_host: spec.docker_host,
                            tag_ids,
                        });
                        report.created += 1;
                    }
                    Err(e) => {
                        warn!("Failed to create monitor '{}': {}", spec.name, e);
                        report.failed += 1;
                        self.pace().await;
                    }
                }
            }
        }
    }

    /// Fixed pacing delay after a state-changing call
    async fn pace(&self) {
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }
    }
}
