//! Session management for the monitor service connection
//!
//! The session manager owns the authenticated service handle plus the
//! credentials used to obtain it. Every remote call goes through
//! [`Session::invoke`], which transparently re-authenticates and retries
//! the failed call exactly once when the service reports an expired
//! session. A failed initial login is fatal for the whole run; a failed
//! re-login only fails the operation that triggered it.

use crate::error::Result;
use crate::traits::MonitorService;
use std::future::Future;
use std::pin::Pin;
use tracing::{info, warn};

/// Boxed future returned by service-call closures
pub type ServiceCall<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Authenticated connection to the monitor service
pub struct Session<S> {
    service: S,
    username: String,
    password: String,
}

impl<S: MonitorService> Session<S> {
    /// Connect and authenticate
    ///
    /// This performs the initial login; an error here aborts the run
    /// before any reconciliation work.
    pub async fn connect(
        service: S,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let username = username.into();
        let password = password.into();

        info!("Authenticating as {}", username);
        service.login(&username, &password).await?;
        info!("Authentication successful");

        Ok(Self {
            service,
            username,
            password,
        })
    }

    /// Invoke a remote call with session recovery
    ///
    /// On `Error::SessionExpired` the stored credentials are used to
    /// re-login and the call is retried exactly once. Any other error,
    /// and any error from the retried call, propagates to the caller.
    pub async fn invoke<'s, T, F>(&'s self, op: F) -> Result<T>
    where
        F: Fn(&'s S) -> ServiceCall<'s, T>,
    {
        match op(&self.service).await {
            Err(e) if e.is_session_expired() => {
                warn!("Session expired ({}), re-authenticating", e);
                self.service.login(&self.username, &self.password).await?;
                info!("Re-authenticated successfully");
                op(&self.service).await
            }
            other => other,
        }
    }
}
