pub mod backend;
pub mod config;
pub mod core;
pub mod utils;

// re‑export ergonomic entry points
pub use crate::core::client::{Client, ClientOptions};
pub use crate::core::connection_manager::ConnectionManager;
pub use config::{Config, ConfigResolver};
