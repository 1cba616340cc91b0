pub mod auth;
pub mod client;
pub mod committer;
pub mod connection_manager;
pub mod errors;
pub mod session;
pub mod status;
pub mod sync;

// Re-export the modules here for easy import elsewhere.
pub use connection_manager::*;
pub use errors::*;
pub use session::*;
pub use status::*;

/// The host project whose externally-issued tokens are valid. Tokens are
/// scoped to this project; against any other project they produce an
/// identity mismatch, so anonymous sign-in is the safe default there.
pub const CANONICAL_PROJECT: &str = "ledgerlog-105d1";

/// Logical path of the shared record collection. The tenant and namespace
/// segments are constants, never user input.
pub const RECORDS_PATH: [&str; 5] = ["artifacts", "ledgerlog-prod-v1", "public", "data", "records"];
