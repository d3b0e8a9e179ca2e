// # Uptime Kuma REST Adapter
//
// Implements the `MonitorService` trait against an Uptime Kuma REST
// management gateway. Uptime Kuma's native transport is Socket.IO RPC;
// this adapter targets the REST bridge deployed in front of it, which
// exposes the same operations over plain HTTP with bearer-token
// sessions.
//
// ## Session handling
//
// `POST /login/access-token` exchanges username/password for a bearer
// token held behind a `tokio::sync::RwLock` so `login` can be re-invoked
// through `&self` mid-run. Any 401/403 response maps to
// `Error::SessionExpired`, which the session manager turns into one
// re-login-and-retry. API-key authentication is not supported.
//
// ## Security
//
// Credentials are request-scoped arguments; the stored token never
// appears in logs or Debug output.

use async_trait::async_trait;
use kuma_core::model::{
    DockerHost, DockerHostId, EntryKind, ExistingMonitor, MonitorId, MonitorSpec, Tag, TagId,
    HTTP_ACCEPTED_STATUS, HTTP_CHECK_INTERVAL_SECS, HTTP_MAX_REDIRECTS, HTTP_MAX_RETRIES,
    HTTP_RETRY_INTERVAL_SECS, HTTP_TIMEOUT_SECS,
};
use kuma_core::traits::MonitorService;
use kuma_core::{Error, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::RwLock;

/// Color assigned to tags this tool creates
const TAG_COLOR: &str = "#4299e1";

/// Timeout for establishing the TCP connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a full request/response exchange
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Monitor service client over the REST management gateway
pub struct RestMonitorService {
    base_url: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for RestMonitorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestMonitorService")
            .field("base_url", &self.base_url)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MonitorsResponse {
    #[serde(default)]
    monitors: Vec<MonitorPayload>,
}

#[derive(Debug, Deserialize)]
struct MonitorPayload {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    docker_host: Option<i64>,
    #[serde(default)]
    tags: Vec<TagBinding>,
}

#[derive(Debug, Deserialize)]
struct TagBinding {
    tag_id: i64,
}

#[derive(Debug, Deserialize)]
struct CreateMonitorResponse {
    #[serde(rename = "monitorID")]
    monitor_id: i64,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    tags: Vec<TagPayload>,
}

#[derive(Debug, Deserialize)]
struct TagPayload {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DockerHostsResponse {
    #[serde(default, rename = "dockerHosts")]
    docker_hosts: Vec<DockerHostPayload>,
}

#[derive(Debug, Deserialize)]
struct DockerHostPayload {
    id: i64,
    name: String,
}

impl RestMonitorService {
    /// Create a client for the gateway at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current bearer token; a call before `login` is a session error
    async fn bearer(&self) -> Result<String> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::session_expired("no active session"))
    }

    /// Map a non-success response to the error taxonomy
    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        match status.as_u16() {
            401 | 403 => {
                tracing::debug!("{} rejected with {}, treating session as expired", context, status);
                Err(Error::session_expired(format!("{context}: {status}")))
            }
            _ => {
                tracing::warn!("{} failed: {} - {}", context, status, body);
                Err(Error::service(format!("{context}: {status} - {body}")))
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        let token = self.bearer().await?;
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| Error::http(format!("{context}: {e}")))?;

        Self::check(response, context)
            .await?
            .json()
            .await
            .map_err(|e| Error::service(format!("{context}: malformed response: {e}")))
    }

    fn creation_payload(spec: &MonitorSpec) -> Result<serde_json::Value> {
        match spec.kind {
            EntryKind::Http => Ok(json!({
                "type": "http",
                "name": spec.name,
                "url": spec.url,
                "method": "GET",
                "interval": HTTP_CHECK_INTERVAL_SECS,
                "retryInterval": HTTP_RETRY_INTERVAL_SECS,
                "maxretries": HTTP_MAX_RETRIES,
                "timeout": HTTP_TIMEOUT_SECS,
                "accepted_statuscodes": [HTTP_ACCEPTED_STATUS],
                "maxredirects": HTTP_MAX_REDIRECTS,
            })),
            EntryKind::Docker => {
                let host = spec.docker_host.ok_or_else(|| {
                    Error::not_found(format!(
                        "monitor '{}' has no Docker host binding",
                        spec.name
                    ))
                })?;
                Ok(json!({
                    "type": "docker",
                    "name": spec.name,
                    "docker_container": spec.name,
                    "docker_host": host.0,
                }))
            }
        }
    }
}

#[async_trait]
impl MonitorService for RestMonitorService {
    async fn login(&self, username: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("/login/access-token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| Error::auth(format!("login request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!("login rejected: {status} {body}")));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("malformed login response: {e}")))?;

        *self.token.write().await = Some(login.access_token);
        tracing::debug!("Obtained session token from {}", self.base_url);
        Ok(())
    }

    async fn monitors(&self) -> Result<Vec<ExistingMonitor>> {
        let response: MonitorsResponse = self.get_json("/monitors", "list monitors").await?;

        // Monitors of kinds this tool does not manage (ping, port, ...)
        // are invisible to reconciliation and never touched.
        let monitors = response
            .monitors
            .into_iter()
            .filter_map(|m| {
                let kind = match m.kind.as_str() {
                    "http" => EntryKind::Http,
                    "docker" => EntryKind::Docker,
                    _ => return None,
                };
                Some(ExistingMonitor {
                    id: MonitorId(m.id),
                    name: m.name,
                    kind,
                    docker_host: m.docker_host.map(DockerHostId),
                    tag_ids: m.tags.into_iter().map(|t| TagId(t.tag_id)).collect(),
                })
            })
            .collect();

        Ok(monitors)
    }

    async fn create_monitor(&self, spec: &MonitorSpec) -> Result<MonitorId> {
        let payload = Self::creation_payload(spec)?;
        let token = self.bearer().await?;
        tracing::debug!(
            "Creating {} monitor '{}'",
            spec.kind.category_tag(),
            spec.name
        );

        let response = self
            .client
            .post(self.url("/monitors"))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("create monitor: {e}")))?;

        let created: CreateMonitorResponse = Self::check(response, "create monitor")
            .await?
            .json()
            .await
            .map_err(|e| Error::service(format!("create monitor: malformed response: {e}")))?;

        Ok(MonitorId(created.monitor_id))
    }

    async fn delete_monitor(&self, id: MonitorId) -> Result<()> {
        let token = self.bearer().await?;
        tracing::debug!("Deleting monitor {}", id);
        let response = self
            .client
            .delete(self.url(&format!("/monitors/{}", id.0)))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| Error::http(format!("delete monitor {id}: {e}")))?;

        Self::check(response, "delete monitor").await?;
        Ok(())
    }

    async fn add_monitor_tag(&self, monitor: MonitorId, tag: TagId) -> Result<()> {
        let token = self.bearer().await?;
        let response = self
            .client
            .post(self.url(&format!("/monitors/{}/tag", monitor.0)))
            .bearer_auth(&token)
            .json(&json!({ "tag_id": tag.0, "value": "" }))
            .send()
            .await
            .map_err(|e| Error::http(format!("add tag {tag} to monitor {monitor}: {e}")))?;

        Self::check(response, "add monitor tag").await?;
        Ok(())
    }

    async fn remove_monitor_tag(&self, monitor: MonitorId, tag: TagId) -> Result<()> {
        let token = self.bearer().await?;
        let response = self
            .client
            .delete(self.url(&format!("/monitors/{}/tag", monitor.0)))
            .bearer_auth(&token)
            .json(&json!({ "tag_id": tag.0, "value": "" }))
            .send()
            .await
            .map_err(|e| Error::http(format!("remove tag {tag} from monitor {monitor}: {e}")))?;

        Self::check(response, "remove monitor tag").await?;
        Ok(())
    }

    async fn tags(&self) -> Result<Vec<Tag>> {
        let response: TagsResponse = self.get_json("/tags", "list tags").await?;
        Ok(response
            .tags
            .into_iter()
            .map(|t| Tag {
                id: TagId(t.id),
                name: t.name,
            })
            .collect())
    }

    async fn create_tag(&self, name: &str) -> Result<Tag> {
        let token = self.bearer().await?;
        tracing::debug!("Creating tag '{}'", name);
        let response = self
            .client
            .post(self.url("/tags"))
            .bearer_auth(&token)
            .json(&json!({ "name": name, "color": TAG_COLOR }))
            .send()
            .await
            .map_err(|e| Error::http(format!("create tag '{name}': {e}")))?;

        let tag: TagPayload = Self::check(response, "create tag")
            .await?
            .json()
            .await
            .map_err(|e| Error::service(format!("create tag: malformed response: {e}")))?;

        Ok(Tag {
            id: TagId(tag.id),
            name: tag.name,
        })
    }

    async fn docker_hosts(&self) -> Result<Vec<DockerHost>> {
        let response: DockerHostsResponse =
            self.get_json("/docker-hosts", "list docker hosts").await?;
        Ok(response
            .docker_hosts
            .into_iter()
            .map(|h| DockerHost {
                id: DockerHostId(h.id),
                name: h.name,
            })
            .collect())
    }
}
