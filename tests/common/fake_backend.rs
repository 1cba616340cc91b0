//! A deterministic **in-process stand-in** for the document-store backend.
//!
//! *  **From the test's perspective**
//!    * Tweak `FakeBehavior` before (or between) connections to make the
//!      backend refuse connections, reject handshakes, or deny access.
//!    * Drive notifications by hand with `push_identity` / `push_snapshot`
//!      on a specific connection, and inspect counters for assertions.
//!
//! *  **Why this exists**: It lets integration tests exercise the *real*
//!    session machinery (tasks, channels, epoch guards) without any
//!    network backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use ledgerlog_core::backend::{
    BackendError, Connection, Connector, Document, Identity, NewRecord, Provenance, SnapshotEvent,
};
use ledgerlog_core::config::Config;
use tokio::sync::mpsc;

/// Knobs a test flips to steer the fake. Read at call time, so they can
/// change between sessions.
#[derive(Debug, Default, Clone)]
pub struct FakeBehavior {
    /// Refuse to construct connections (malformed configuration).
    pub fail_connect: bool,
    /// Reject sign-in with this backend error code.
    pub fail_auth_code: Option<String>,
    /// Deliver a permission denial instead of snapshots.
    pub deny_reads: bool,
    /// Reject appends with a permission denial.
    pub deny_writes: bool,
    /// Suppress the automatic identity delivery after sign-in; the test
    /// pushes identities by hand.
    pub manual_identity: bool,
    /// Hold every append open this long, to observe the busy flag.
    pub append_delay: Option<Duration>,
}

/// State shared by the connector and every connection it produced.
pub struct FakeShared {
    pub behavior: Mutex<FakeBehavior>,
    pub docs: Mutex<Vec<Document>>,
    pub connect_count: AtomicUsize,
    pub release_count: AtomicUsize,
    pub append_count: AtomicUsize,
    pub anon_sign_ins: AtomicUsize,
    pub token_sign_ins: AtomicUsize,
}

/// One fake connection. Watch channels are per-connection, exactly like a
/// real client handle, so a test can deliver late notifications to a
/// superseded session specifically.
pub struct FakeConn {
    shared: Arc<FakeShared>,
    identity_watchers: Mutex<Vec<mpsc::Sender<Identity>>>,
    record_watchers: Mutex<Vec<mpsc::Sender<SnapshotEvent>>>,
    current_identity: Mutex<Option<Identity>>,
    pub released: AtomicBool,
}

/// The `Connector` handed to the client under test.
pub struct FakeBackend {
    shared: Arc<FakeShared>,
    conns: Mutex<Vec<Arc<FakeConn>>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            shared: Arc::new(FakeShared {
                behavior: Mutex::new(FakeBehavior::default()),
                docs: Mutex::new(Vec::new()),
                connect_count: AtomicUsize::new(0),
                release_count: AtomicUsize::new(0),
                append_count: AtomicUsize::new(0),
                anon_sign_ins: AtomicUsize::new(0),
                token_sign_ins: AtomicUsize::new(0),
            }),
            conns: Mutex::new(Vec::new()),
        })
    }

    pub fn set_behavior(&self, f: impl FnOnce(&mut FakeBehavior)) {
        f(&mut self.shared.behavior.lock().unwrap());
    }

    /// The `idx`-th connection ever constructed (0 = first session).
    pub fn connection(&self, idx: usize) -> Arc<FakeConn> {
        self.conns.lock().unwrap()[idx].clone()
    }

    pub fn connect_count(&self) -> usize {
        self.shared.connect_count.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.shared.release_count.load(Ordering::SeqCst)
    }

    pub fn append_count(&self) -> usize {
        self.shared.append_count.load(Ordering::SeqCst)
    }

    pub fn anon_sign_ins(&self) -> usize {
        self.shared.anon_sign_ins.load(Ordering::SeqCst)
    }

    pub fn token_sign_ins(&self) -> usize {
        self.shared.token_sign_ins.load(Ordering::SeqCst)
    }

    /// Seed a document as if some other client had written it.
    pub fn add_doc(&self, content: &str, created_at: Option<i64>, timestamp: &str) {
        let mut data = json!({ "content": content, "timestamp": timestamp });
        if let Some(ts) = created_at {
            data["createdAt"] = json!(ts);
        }
        self.shared.docs.lock().unwrap().push(Document {
            id: Uuid::new_v4().to_string(),
            data,
        });
    }

    pub fn docs(&self) -> Vec<Document> {
        self.shared.docs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for FakeBackend {
    async fn connect(&self, _config: &Config) -> Result<Arc<dyn Connection>, BackendError> {
        if self.shared.behavior.lock().unwrap().fail_connect {
            return Err(BackendError::InvalidConfig("bad config".into()));
        }
        self.shared.connect_count.fetch_add(1, Ordering::SeqCst);
        let conn = Arc::new(FakeConn {
            shared: self.shared.clone(),
            identity_watchers: Mutex::new(Vec::new()),
            record_watchers: Mutex::new(Vec::new()),
            current_identity: Mutex::new(None),
            released: AtomicBool::new(false),
        });
        self.conns.lock().unwrap().push(conn.clone());
        Ok(conn)
    }
}

impl FakeConn {
    fn behavior(&self) -> FakeBehavior {
        self.shared.behavior.lock().unwrap().clone()
    }

    /// How many identity watches were taken out on this connection. Lets
    /// a test wait until the auth task is actually subscribed before
    /// pushing notifications.
    pub fn identity_watcher_count(&self) -> usize {
        self.identity_watchers.lock().unwrap().len()
    }

    pub fn record_watcher_count(&self) -> usize {
        self.record_watchers.lock().unwrap().len()
    }

    /// Deliver an identity notification on this connection's channels.
    pub fn push_identity(&self, identity: Identity) {
        for tx in self.identity_watchers.lock().unwrap().iter() {
            let _ = tx.try_send(identity.clone());
        }
    }

    /// Deliver the current collection contents on this connection.
    pub fn push_snapshot(&self) {
        let docs = self.shared.docs.lock().unwrap().clone();
        for tx in self.record_watchers.lock().unwrap().iter() {
            let _ = tx.try_send(SnapshotEvent::Snapshot(docs.clone()));
        }
    }

    /// Deliver a subscription error on this connection.
    pub fn push_error(&self, err: BackendError) {
        for tx in self.record_watchers.lock().unwrap().iter() {
            let _ = tx.try_send(SnapshotEvent::Error(err.clone()));
        }
    }

    fn complete_sign_in(&self, identity: Identity) {
        *self.current_identity.lock().unwrap() = Some(identity.clone());
        if !self.behavior().manual_identity {
            self.push_identity(identity);
        }
    }
}

#[async_trait]
impl Connection for FakeConn {
    async fn sign_in_anonymously(&self) -> Result<(), BackendError> {
        if let Some(code) = self.behavior().fail_auth_code {
            return Err(BackendError::HandshakeFailed {
                code: Some(code),
                message: "sign-in rejected".into(),
            });
        }
        self.shared.anon_sign_ins.fetch_add(1, Ordering::SeqCst);
        self.complete_sign_in(Identity {
            uid: format!("anon-{}", Uuid::new_v4()),
            provenance: Provenance::Anonymous,
        });
        Ok(())
    }

    async fn sign_in_with_token(&self, token: &str) -> Result<(), BackendError> {
        if let Some(code) = self.behavior().fail_auth_code {
            return Err(BackendError::HandshakeFailed {
                code: Some(code),
                message: "sign-in rejected".into(),
            });
        }
        self.shared.token_sign_ins.fetch_add(1, Ordering::SeqCst);
        self.complete_sign_in(Identity {
            uid: format!("token-{token}"),
            provenance: Provenance::Token,
        });
        Ok(())
    }

    async fn watch_identity(&self) -> mpsc::Receiver<Identity> {
        let (tx, rx) = mpsc::channel(32);
        if let Some(identity) = self.current_identity.lock().unwrap().clone() {
            let _ = tx.try_send(identity);
        }
        self.identity_watchers.lock().unwrap().push(tx);
        rx
    }

    async fn watch_records(&self, _path: &[&str]) -> mpsc::Receiver<SnapshotEvent> {
        let (tx, rx) = mpsc::channel(32);
        let behavior = self.behavior();
        if behavior.deny_reads {
            let _ = tx.try_send(SnapshotEvent::Error(BackendError::PermissionDenied(
                "rules rejected the read".into(),
            )));
        } else {
            let docs = self.shared.docs.lock().unwrap().clone();
            let _ = tx.try_send(SnapshotEvent::Snapshot(docs));
        }
        self.record_watchers.lock().unwrap().push(tx);
        rx
    }

    async fn append_record(
        &self,
        _path: &[&str],
        record: NewRecord,
    ) -> Result<String, BackendError> {
        let behavior = self.behavior();
        if let Some(delay) = behavior.append_delay {
            tokio::time::sleep(delay).await;
        }
        if behavior.deny_writes {
            return Err(BackendError::PermissionDenied(
                "rules rejected the write".into(),
            ));
        }
        let id = Uuid::new_v4().to_string();
        self.shared.docs.lock().unwrap().push(Document {
            id: id.clone(),
            data: json!({
                "content": record.content,
                "createdAt": record.created_at,
                "timestamp": record.timestamp,
            }),
        });
        self.shared.append_count.fetch_add(1, Ordering::SeqCst);
        self.push_snapshot();
        Ok(id)
    }

    async fn release(&self) -> Result<(), BackendError> {
        self.released.store(true, Ordering::SeqCst);
        self.shared.release_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
