use std::env;

use log::{debug, warn};

use super::model::Config;
use super::store::OverrideStore;

/// Environment variable names scanned for a JSON configuration, in order.
/// Three hosting origins are normalized into this one logical input.
pub const CONFIG_ENV_VARS: [&str; 3] =
    ["LEDGERLOG_CONFIG", "HOST_BACKEND_CONFIG", "BACKEND_CONFIG"];

/// Environment variable carrying an externally-issued auth token.
pub const AUTH_TOKEN_ENV_VAR: &str = "LEDGERLOG_AUTH_TOKEN";

/// First non-empty configuration string found in the environment.
pub fn env_config() -> Option<String> {
    CONFIG_ENV_VARS
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
}

/// Externally-issued auth token from the environment, if any.
pub fn auth_token_from_env() -> Option<String> {
    env::var(AUTH_TOKEN_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Selects the active Configuration from ranked sources.
///
/// Priority order, first match wins:
/// 1. the compiled-in fixed override, when it names a project;
/// 2. the persisted manual override (corrupt entries are discarded by the
///    store and resolution falls through);
/// 3. a JSON string from the environment.
///
/// Resolution only reads; persisting an override is the apply step's job.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    fixed: Option<Config>,
    store: OverrideStore,
}

impl ConfigResolver {
    pub fn new(fixed: Option<Config>, store: OverrideStore) -> Self {
        Self { fixed, store }
    }

    pub fn store(&self) -> &OverrideStore {
        &self.store
    }

    /// Whether the compiled-in override takes precedence over everything.
    pub fn fixed_override_active(&self) -> bool {
        self.fixed.as_ref().is_some_and(|c| c.is_usable())
    }

    /// One resolution pass against the process environment.
    pub fn resolve(&self) -> Option<Config> {
        self.resolve_with(env_config().as_deref())
    }

    /// One resolution pass with an explicit environment value, so tests
    /// stay clear of process-global state.
    pub fn resolve_with(&self, env_raw: Option<&str>) -> Option<Config> {
        if let Some(fixed) = &self.fixed {
            if fixed.is_usable() {
                debug!("Resolved configuration from the fixed override");
                return Some(fixed.clone());
            }
        }

        match self.store.load() {
            Ok(Some(saved)) => {
                debug!("Resolved configuration from the persisted override");
                return Some(saved);
            }
            Ok(None) => {}
            Err(e) => warn!("Could not read the persisted override: {}", e),
        }

        let raw = env_raw?;
        match serde_json::from_str(raw) {
            Ok(config) => {
                debug!("Resolved configuration from the environment");
                Some(config)
            }
            Err(e) => {
                warn!("Environment configuration is not valid JSON: {}", e);
                None
            }
        }
    }
}
