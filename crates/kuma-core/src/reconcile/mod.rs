//! Reconciliation planning
//!
//! The planner is a pure function from (desired set, existing snapshot,
//! ignore patterns, required tags, mode) to an ordered action list. It
//! performs no I/O, which keeps the diff logic unit-testable without any
//! network mock; the engine applies the actions with the run's error
//! policy.
//!
//! Per source the plan is built in three strictly ordered passes:
//!
//! 1. **Cleanup**: delete every existing monitor of the source's kind
//!    whose name matches an ignore pattern.
//! 2. **Tag verification**: converge tags on monitors that are both
//!    desired and existing. Monitors that already carry the correct tags
//!    produce no action, preserving idempotence.
//! 3. **Creation**: create a monitor for every desired entry with no
//!    existing counterpart, tagging it immediately.

use crate::filter::IgnorePatterns;
use crate::model::{
    DesiredEntry, DockerHostId, EntryKind, ExistingMonitor, MonitorId, MonitorSpec, TagId,
};
use std::collections::HashSet;

/// How the tag-verification pass treats tags it did not put there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagMode {
    /// Add missing required tags, leave existing tags untouched
    #[default]
    Normal,
    /// Strip all tags and re-apply exactly the required set
    Reset,
}

/// Tag ids every managed monitor of a source must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredTags {
    /// Category tag ("traefik" or "docker")
    pub category: TagId,
    /// User-defined group tag
    pub group: TagId,
}

impl RequiredTags {
    /// The required set; a single id when the group tag IS the category tag
    pub fn as_set(&self) -> HashSet<TagId> {
        HashSet::from([self.category, self.group])
    }

    /// The required ids in apply order (category first, then group)
    pub fn as_vec(&self) -> Vec<TagId> {
        if self.category == self.group {
            vec![self.category]
        } else {
            vec![self.category, self.group]
        }
    }
}

/// One corrective step toward the desired state
///
/// Each action commits independently when applied; there is no rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Delete a monitor whose name matches an ignore pattern
    Delete { id: MonitorId, name: String },
    /// Attach the listed missing tags to an existing monitor
    AddTags {
        id: MonitorId,
        name: String,
        tags: Vec<TagId>,
    },
    /// Strip all current tags, then attach exactly the required set
    ResetTags {
        id: MonitorId,
        name: String,
        remove: Vec<TagId>,
        add: Vec<TagId>,
    },
    /// Create a monitor for a desired entry and tag it
    Create { spec: MonitorSpec, group: String },
}

/// Identity of the source being reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceScope {
    pub kind: EntryKind,
    /// Resolved `{group}-docker` host id (Docker sources only); `None`
    /// when the registration is missing, in which case creations are
    /// still planned and fail per-item at apply time
    pub docker_host: Option<DockerHostId>,
}

impl SourceScope {
    pub fn http() -> Self {
        Self {
            kind: EntryKind::Http,
            docker_host: None,
        }
    }

    pub fn docker(host: Option<DockerHostId>) -> Self {
        Self {
            kind: EntryKind::Docker,
            docker_host: host,
        }
    }

    /// Whether an existing monitor belongs to this source
    ///
    /// Docker monitors are attributed by docker-host binding as well as
    /// kind; with no resolved host nothing can be attributed.
    fn owns(&self, monitor: &ExistingMonitor) -> bool {
        match self.kind {
            EntryKind::Http => monitor.kind == EntryKind::Http,
            EntryKind::Docker => {
                monitor.kind == EntryKind::Docker
                    && self.docker_host.is_some()
                    && monitor.docker_host == self.docker_host
            }
        }
    }
}

/// Build the ordered action list for one source
pub fn plan_source(
    desired: &[DesiredEntry],
    existing: &[ExistingMonitor],
    ignore: &IgnorePatterns,
    required: &RequiredTags,
    mode: TagMode,
    scope: SourceScope,
) -> Vec<Action> {
    let mut actions = Vec::new();

    // Pass 1: cleanup
    for monitor in existing.iter().filter(|m| scope.owns(m)) {
        if ignore.is_ignored(&monitor.name) {
            actions.push(Action::Delete {
                id: monitor.id,
                name: monitor.name.clone(),
            });
        }
    }

    let required_set = required.as_set();

    // Pass 2: tag verification
    for entry in desired.iter().filter(|e| !ignore.is_ignored(&e.name)) {
        let Some(monitor) = existing
            .iter()
            .find(|m| scope.owns(m) && m.name == entry.name)
        else {
            continue;
        };

        match mode {
            TagMode::Normal => {
                let missing: Vec<TagId> = required
                    .as_vec()
                    .into_iter()
                    .filter(|t| !monitor.tag_ids.contains(t))
                    .collect();
                if !missing.is_empty() {
                    actions.push(Action::AddTags {
                        id: monitor.id,
                        name: monitor.name.clone(),
                        tags: missing,
                    });
                }
            }
            TagMode::Reset => {
                if monitor.tag_ids != required_set {
                    let mut remove: Vec<TagId> = monitor.tag_ids.iter().copied().collect();
                    remove.sort_by_key(|t| t.0);
                    actions.push(Action::ResetTags {
                        id: monitor.id,
                        name: monitor.name.clone(),
                        remove,
                        add: required.as_vec(),
                    });
                }
            }
        }
    }

    // Pass 3: creation
    for entry in desired.iter().filter(|e| !ignore.is_ignored(&e.name)) {
        let present = existing
            .iter()
            .any(|m| scope.owns(m) && m.name == entry.name);
        if present {
            continue;
        }

        let spec = match entry.kind {
            EntryKind::Http => MonitorSpec::http(&entry.name),
            EntryKind::Docker => MonitorSpec::docker(&entry.name, scope.docker_host),
        };
        actions.push(Action::Create {
            spec,
            group: entry.group.clone(),
        });
    }

    actions
}
