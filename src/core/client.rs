use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use tokio::sync::broadcast;

use crate::backend::{Connector, Identity};
use crate::config::{auth_token_from_env, parse_manual_config, Config, ConfigResolver, OverrideStore};
use crate::core::connection_manager::ConnectionManager;
use crate::core::errors::ClientError;
use crate::core::session::{Record, SessionEvent};
use crate::core::status::{connection_checklist, ChecklistItem, Status};

/// Construction knobs for a [`Client`].
#[derive(Debug, Default)]
pub struct ClientOptions {
    /// Compiled-in configuration override. When it names a project it
    /// outranks every other source and survives all runtime state.
    pub fixed_override: Option<Config>,
    /// Externally-issued auth token, when the host supplied one. Defaults
    /// to [`auth_token_from_env`] when `None`.
    pub auth_token: Option<String>,
    /// Root directory for the persisted override. Defaults to the user's
    /// config dir; tests point this at a tempdir.
    pub storage_dir: Option<PathBuf>,
}

/// The assembled pipeline: configuration resolution feeding the session
/// lifecycle.
///
/// Configuration change → connection rebuild → auth handshake → record
/// subscription; each stage tears its predecessor down explicitly before
/// the replacement is built.
pub struct Client {
    resolver: ConfigResolver,
    manager: ConnectionManager,
}

impl Client {
    pub fn new(connector: Arc<dyn Connector>, options: ClientOptions) -> Result<Self, ClientError> {
        let store = match options.storage_dir {
            Some(dir) => OverrideStore::at(dir)?,
            None => OverrideStore::new()?,
        };
        let resolver = ConfigResolver::new(options.fixed_override, store);
        let auth_token = options.auth_token.or_else(auth_token_from_env);
        let manager = ConnectionManager::new(
            connector,
            auth_token,
            resolver.fixed_override_active(),
        );
        Ok(Self { resolver, manager })
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    /// Subscribe to session state-change events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.manager.subscribe()
    }

    /// Resolves a configuration and starts (or restarts) the session.
    pub async fn start(&self) -> Result<(), ClientError> {
        self.start_with(crate::config::env_config().as_deref()).await
    }

    /// [`Self::start`] with an explicit environment value.
    pub async fn start_with(&self, env_raw: Option<&str>) -> Result<(), ClientError> {
        let config = self
            .resolver
            .resolve_with(env_raw)
            .ok_or(ClientError::ConfigUnresolved)?;
        self.manager.apply_config(config).await;
        Ok(())
    }

    /// Applies pasted configuration text: parse, persist as the manual
    /// override, rebuild the session. A parse failure changes nothing.
    pub async fn apply_manual_config(&self, input: &str) -> Result<(), ClientError> {
        let config = parse_manual_config(input)?;
        self.resolver.store().save(&config)?;
        info!("Manual override saved for project '{}'", config.project_id);
        self.manager.apply_config(config).await;
        Ok(())
    }

    /// Clears the persisted override and re-runs resolution from the top
    /// priority level.
    pub async fn reset_override(&self) -> Result<(), ClientError> {
        self.resolver.store().clear()?;
        info!("Manual override cleared; re-resolving");
        self.start().await
    }

    pub async fn commit_record(&self, content: &str) -> Result<(), ClientError> {
        self.manager.commit_record(content).await
    }

    pub async fn auth_status(&self) -> Status {
        self.manager.auth_status().await
    }

    pub async fn data_status(&self) -> Status {
        self.manager.data_status().await
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.manager.identity().await
    }

    pub async fn records(&self) -> Vec<Record> {
        self.manager.records().await
    }

    pub async fn current_config(&self) -> Option<Config> {
        self.manager.current_config().await
    }

    pub async fn is_committing(&self) -> bool {
        self.manager.is_committing().await
    }

    /// Whether any override (compiled-in or persisted) is in force; a UI
    /// shows the reset action only in that case.
    pub fn override_in_force(&self) -> bool {
        self.resolver.fixed_override_active() || self.resolver.store().exists()
    }

    /// The remediation checklist for the current statuses, when the
    /// session is blocked.
    pub async fn checklist(&self) -> Option<Vec<ChecklistItem>> {
        let project = self
            .current_config()
            .await
            .map(|c| c.project_id)
            .unwrap_or_default();
        let auth = self.auth_status().await;
        let data = self.data_status().await;
        connection_checklist(&project, &auth, &data)
    }
}
