use std::fmt::{self, Display};

/// A central error enum for backend collaborator failures.
///
/// `Clone` because snapshot subscriptions deliver errors through channels
/// and more than one consumer may observe the same failure.
#[derive(Debug, Clone)]
pub enum BackendError {
    /// The Configuration could not be turned into a live connection.
    InvalidConfig(String),
    /// The backend rejected the credentials during sign-in.
    HandshakeFailed {
        /// Machine-readable code as reported by the backend, if any
        /// (e.g. "auth/operation-not-allowed").
        code: Option<String>,
        message: String,
    },
    /// The backend's access rules rejected the operation.
    PermissionDenied(String),
    /// The backend could not be reached or answered with a transient fault.
    Unavailable(String),
}

impl BackendError {
    /// The backend-provided error code, when one exists.
    pub fn code(&self) -> Option<&str> {
        match self {
            BackendError::HandshakeFailed { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, BackendError::PermissionDenied(_))
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            BackendError::HandshakeFailed { code, message } => match code {
                Some(code) => write!(f, "handshake failed ({}): {}", code, message),
                None => write!(f, "handshake failed: {}", message),
            },
            BackendError::PermissionDenied(msg) => write!(f, "permission denied: {}", msg),
            BackendError::Unavailable(msg) => write!(f, "backend unavailable: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}
