// # kuma-core
//
// Core library for the Uptime Kuma monitor sync tool.
//
// ## Architecture Overview
//
// This library keeps a set of monitors in a monitor service converged
// with the live state of Traefik routers and Docker hosts:
//
// - **DesiredSource**: Trait for fetching desired-state name listings
// - **MonitorService**: Trait boundary around the monitor service API
// - **Session**: Authenticated connection with expiry recovery
// - **TagResolver**: Memoized tag name → id resolution
// - **plan_source / SyncEngine**: Pure reconciliation planner and the
//   engine that applies its action list
//
// ## Design Principles
//
// 1. **Pure diff, effectful apply**: the planner does no I/O and is unit
//    tested without mocks; the engine owns the error policy
// 2. **Idempotency**: a converged state plans zero actions, so a second
//    run performs zero writes
// 3. **Per-item failure isolation**: only the initial login is fatal;
//    every other failure is logged and skipped
// 4. **Library-first**: the binary is a thin integration layer

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod reconcile;
pub mod session;
pub mod tags;
pub mod traits;

// Re-export core types for convenience
pub use config::{KumaConfig, SourceConfig, SyncConfig};
pub use engine::{SyncEngine, SyncReport};
pub use error::{Error, Result};
pub use filter::IgnorePatterns;
pub use model::{
    DesiredEntry, DockerHost, DockerHostId, EntryKind, ExistingMonitor, MonitorId, MonitorSpec,
    Tag, TagId,
};
pub use reconcile::{Action, RequiredTags, SourceScope, TagMode, plan_source};
pub use session::Session;
pub use tags::TagResolver;
pub use traits::{DesiredSource, MonitorService};
