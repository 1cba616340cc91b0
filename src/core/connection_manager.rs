use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{broadcast, Mutex};

use crate::backend::{Connector, Identity};
use crate::config::Config;
use crate::core::auth;
use crate::core::session::{Record, SessionEvent, SessionInner};
use crate::core::status::Status;

/// Owns the lifecycle of the single backend connection.
///
/// The internal state is one `SessionInner` behind an Arc and a Mutex, so
/// the manager can be cloned cheaply into the spawned session tasks; a
/// clone only bumps the reference count. There is never more than one live
/// connection: applying a Configuration tears the previous session down
/// completely before the replacement is built.
#[derive(Clone)]
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    auth_token: Option<String>,
    override_active: bool,
    inner: Arc<Mutex<SessionInner>>,
    events: broadcast::Sender<SessionEvent>,
}

impl ConnectionManager {
    /// - `connector`: the seam to the real backend (or a test stand-in)
    /// - `auth_token`: externally-issued token, when the host supplied one
    /// - `override_active`: whether a compiled-in config override is in
    ///   force (this disables token sign-in)
    pub fn new(
        connector: Arc<dyn Connector>,
        auth_token: Option<String>,
        override_active: bool,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            connector,
            auth_token,
            override_active,
            inner: Arc::new(Mutex::new(SessionInner::new())),
            events,
        }
    }

    /// Subscribe to session state-change events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Replaces the active session with one built from `config`.
    ///
    /// Any replacement counts as new, value equality is not consulted. The
    /// superseded session's tasks are cancelled and its handle released
    /// fire-and-forget before the new connection is constructed, and the
    /// whole session state (identity, records, statuses) starts fresh. A
    /// configuration without a project identifier is ignored.
    pub async fn apply_config(&self, config: Config) {
        if !config.is_usable() {
            debug!("Ignoring configuration without a project identifier");
            return;
        }
        info!("Applying configuration for project '{}'", config.project_id);

        // Tear down the superseded session before anything new is built.
        let (old_handle, old_auth, old_sync, epoch) = {
            let mut s = self.inner.lock().await;
            s.epoch += 1;
            s.identity = None;
            s.records.clear();
            s.config = Some(config.clone());
            (s.handle.take(), s.auth_task.take(), s.sync_task.take(), s.epoch)
        };
        if let Some(task) = old_auth {
            task.abort();
        }
        if let Some(task) = old_sync {
            task.abort();
        }
        if let Some(handle) = old_handle {
            // Fire-and-forget: release failures are swallowed.
            tokio::spawn(async move {
                if let Err(e) = handle.release().await {
                    debug!("Release of superseded connection failed: {}", e);
                }
            });
        }
        self.emit(SessionEvent::ConfigApplied(config.clone()));

        match self.connector.connect(&config).await {
            Ok(handle) => {
                {
                    let mut s = self.inner.lock().await;
                    if s.epoch != epoch {
                        // Superseded while connecting; the orphan handle is
                        // released and nothing else happens.
                        drop(s);
                        tokio::spawn(async move {
                            let _ = handle.release().await;
                        });
                        return;
                    }
                    s.handle = Some(handle.clone());
                    s.auth_status = Status::pending("Checking Identity...");
                    s.data_status = Status::pending("Waiting For Sync");
                }
                self.emit(SessionEvent::AuthStatus(Status::pending("Checking Identity...")));
                self.emit(SessionEvent::DataStatus(Status::pending("Waiting For Sync")));

                let task = tokio::spawn(auth::run(self.clone(), handle, config, epoch));
                let mut s = self.inner.lock().await;
                if s.epoch == epoch {
                    s.auth_task = Some(task);
                } else {
                    task.abort();
                }
            }
            Err(e) => {
                warn!("Connection construction failed: {}", e);
                let failed = Status::failed("Config Error");
                {
                    let mut s = self.inner.lock().await;
                    if s.epoch != epoch {
                        return;
                    }
                    s.auth_status = failed.clone();
                }
                self.emit(SessionEvent::AuthStatus(failed));
            }
        }
    }

    pub async fn auth_status(&self) -> Status {
        self.inner.lock().await.auth_status.clone()
    }

    pub async fn data_status(&self) -> Status {
        self.inner.lock().await.data_status.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.inner.lock().await.identity.clone()
    }

    pub async fn records(&self) -> Vec<Record> {
        self.inner.lock().await.records.clone()
    }

    pub async fn current_config(&self) -> Option<Config> {
        self.inner.lock().await.config.clone()
    }

    /// Whether a record commit is currently in flight.
    pub async fn is_committing(&self) -> bool {
        self.inner.lock().await.commit_in_flight
    }

    pub(crate) fn state(&self) -> &Arc<Mutex<SessionInner>> {
        &self.inner
    }

    pub(crate) fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub(crate) fn override_active(&self) -> bool {
        self.override_active
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No receivers is fine; events are advisory.
        let _ = self.events.send(event);
    }
}
