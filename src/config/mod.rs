pub mod manual;
pub mod model;
pub mod resolver;
pub mod store;

// Re-export the modules here for easy import elsewhere.
pub use manual::parse_manual_config;
pub use model::Config;
pub use resolver::{auth_token_from_env, env_config, ConfigResolver};
pub use store::OverrideStore;
