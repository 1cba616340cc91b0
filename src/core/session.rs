use std::sync::Arc;

use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::backend::{Connection, Document, Identity};
use crate::config::Config;
use crate::core::status::Status;

/// A committed record as projected from a snapshot. Immutable once
/// committed; the ordering key is `created_at` descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Backend-assigned document id.
    pub id: String,
    pub content: String,
    /// Commit timestamp in milliseconds. Absent on documents written by
    /// older or foreign clients; those sort last.
    pub created_at: Option<i64>,
    /// Display label frozen at commit time.
    pub timestamp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordFields {
    #[serde(default)]
    content: String,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    timestamp: String,
}

impl Record {
    /// A document with an unreadable payload still shows up, just empty;
    /// the projection never fails on one bad document.
    pub fn from_document(doc: Document) -> Self {
        let fields: RecordFields = serde_json::from_value(doc.data).unwrap_or_default();
        Self {
            id: doc.id,
            content: fields.content,
            created_at: fields.created_at,
            timestamp: fields.timestamp,
        }
    }
}

/// State-change notifications fanned out to observers (a UI, tests).
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new Configuration was accepted and a session rebuild started.
    ConfigApplied(Config),
    AuthStatus(Status),
    DataStatus(Status),
    IdentityChanged(Identity),
    RecordsUpdated(Vec<Record>),
    CommitBusy(bool),
}

/// The one mutable session record: one Configuration, one handle, one
/// identity, alive until superseded.
///
/// `epoch` increments on every configuration replacement. Every spawned
/// task captures the epoch it was started under and compares it under the
/// lock before applying any asynchronous result, so nothing delivered late
/// can mutate a successor session.
pub(crate) struct SessionInner {
    pub epoch: u64,
    pub config: Option<Config>,
    pub handle: Option<Arc<dyn Connection>>,
    pub identity: Option<Identity>,
    pub auth_status: Status,
    pub data_status: Status,
    pub records: Vec<Record>,
    pub commit_in_flight: bool,
    pub auth_task: Option<JoinHandle<()>>,
    pub sync_task: Option<JoinHandle<()>>,
}

impl SessionInner {
    pub fn new() -> Self {
        Self {
            epoch: 0,
            config: None,
            handle: None,
            identity: None,
            auth_status: Status::pending("Checking Identity..."),
            data_status: Status::pending("Waiting For Sync"),
            records: Vec::new(),
            commit_in_flight: false,
            auth_task: None,
            sync_task: None,
        }
    }
}
