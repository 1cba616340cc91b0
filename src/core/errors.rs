use std::fmt::{self, Display};
use std::io;

/// Errors that cross the crate's public API.
///
/// Connection, handshake and access failures never appear here: they are
/// converted into status-state transitions at the boundary where the
/// asynchronous operation was issued.
#[derive(Debug)]
pub enum ClientError {
    /// No ranked source produced a valid Configuration; the system stays
    /// idle and no connection is attempted.
    ConfigUnresolved,
    /// Pasted configuration text could not be parsed.
    MalformedInput(String),
    /// Reading or writing the persisted override failed.
    Storage(io::Error),
    /// The backend rejected an append. Not retried automatically; the
    /// caller keeps the input and decides.
    CommitRejected(String),
}

/// Convert from std::io::Error.
impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> ClientError {
        ClientError::Storage(err)
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::ConfigUnresolved => write!(f, "no configuration could be resolved"),
            ClientError::MalformedInput(msg) => write!(f, "malformed config input: {}", msg),
            ClientError::Storage(e) => write!(f, "override storage error: {}", e),
            ClientError::CommitRejected(msg) => write!(f, "commit rejected: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}
