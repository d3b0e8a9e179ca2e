// # Monitor Service Trait
//
// Defines the remote-procedure boundary around the monitor service
// (Uptime Kuma). The concrete transport lives behind this interface;
// `kuma-service-rest` adapts it to the REST management gateway.
//
// ## Session semantics
//
// Implementations hold their own authentication state behind `&self`
// (interior mutability) so that `login` can be re-invoked mid-run by the
// session manager. A call made with an invalid session must fail with
// `Error::SessionExpired`, never with a generic service error, because
// that variant is what drives the re-login-and-retry recovery path.

use crate::error::Result;
use crate::model::{DockerHost, ExistingMonitor, MonitorId, MonitorSpec, Tag, TagId};
use async_trait::async_trait;

/// Trait for monitor service implementations
///
/// All operations are remote-procedure style calls. Implementations must
/// be usable across async tasks (`Send + Sync`) and must not retry on
/// their own: retry-after-re-login is owned by the session manager.
#[async_trait]
pub trait MonitorService: Send + Sync {
    /// Authenticate with username/password credentials
    ///
    /// API-key authentication is not supported by this tool's contract.
    async fn login(&self, username: &str, password: &str) -> Result<()>;

    /// List all managed-kind monitors (HTTP and Docker)
    async fn monitors(&self) -> Result<Vec<ExistingMonitor>>;

    /// Create a monitor and return its new id
    async fn create_monitor(&self, spec: &MonitorSpec) -> Result<MonitorId>;

    /// Delete a monitor
    async fn delete_monitor(&self, id: MonitorId) -> Result<()>;

    /// Attach a tag to a monitor
    async fn add_monitor_tag(&self, monitor: MonitorId, tag: TagId) -> Result<()>;

    /// Detach a tag from a monitor
    async fn remove_monitor_tag(&self, monitor: MonitorId, tag: TagId) -> Result<()>;

    /// List all tags
    async fn tags(&self) -> Result<Vec<Tag>>;

    /// Create a tag and return it
    async fn create_tag(&self, name: &str) -> Result<Tag>;

    /// List registered Docker hosts
    async fn docker_hosts(&self) -> Result<Vec<DockerHost>>;
}
