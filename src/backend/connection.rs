use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::backend::errors::BackendError;
use crate::config::Config;

/// How an [`Identity`] was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Anonymous,
    Token,
}

/// The authenticated principal produced by a successful handshake.
///
/// Valid only for the connection that produced it; replacing the
/// connection makes any previously delivered identity meaningless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub provenance: Provenance,
}

/// One raw unit of a collection snapshot: the backend-assigned document
/// id plus its untyped payload.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: serde_json::Value,
}

/// The commit payload for a new record. The timestamp label is frozen at
/// commit time and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub content: String,
    pub created_at: i64,
    pub timestamp: String,
}

/// One delivery on a snapshot subscription: either the full current
/// contents of the collection, or the error that ended it.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
    Snapshot(Vec<Document>),
    Error(BackendError),
}

/// Builds connections from a Configuration. The single seam through which
/// the real backend (or an in-process stand-in) enters the crate.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &Config) -> Result<Arc<dyn Connection>, BackendError>;
}

/// A live connection to the document-store backend, bound to exactly one
/// Configuration.
///
/// Watch channels are per-subscriber queues: dropping the receiver is the
/// unsubscribe. The session tasks that own these receivers are aborted on
/// teardown, which drops them.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn sign_in_anonymously(&self) -> Result<(), BackendError>;

    async fn sign_in_with_token(&self, token: &str) -> Result<(), BackendError>;

    /// Identity-change notifications. The identity resulting from a
    /// sign-in arrives here, not as the return value of the sign-in call.
    async fn watch_identity(&self) -> mpsc::Receiver<Identity>;

    /// Snapshot subscription over the collection at `path`. Delivers the
    /// current contents on every change, or an error event.
    async fn watch_records(&self, path: &[&str]) -> mpsc::Receiver<SnapshotEvent>;

    /// Appends one record; returns the backend-assigned document id.
    async fn append_record(&self, path: &[&str], record: NewRecord)
        -> Result<String, BackendError>;

    /// Releases the underlying resource. Called exactly once, when the
    /// connection is superseded.
    async fn release(&self) -> Result<(), BackendError>;
}
