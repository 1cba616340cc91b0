use std::cmp::Reverse;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::backend::{Connection, SnapshotEvent};
use crate::core::connection_manager::ConnectionManager;
use crate::core::session::{Record, SessionEvent};
use crate::core::status::Status;
use crate::core::RECORDS_PATH;

/// Maintains the live record projection for one session.
///
/// Every snapshot rebuilds the whole projection; there is no incremental
/// patching. Access denial is terminal for the session, any other
/// subscription error is logged and skipped.
pub(crate) async fn run(mgr: ConnectionManager, handle: Arc<dyn Connection>, epoch: u64) {
    let mut snapshot_rx = handle.watch_records(&RECORDS_PATH).await;
    info!("Record subscription established");

    while let Some(event) = snapshot_rx.recv().await {
        match event {
            SnapshotEvent::Snapshot(docs) => {
                let mut records: Vec<Record> =
                    docs.into_iter().map(Record::from_document).collect();
                // Newest first; records lacking a commit timestamp sort last.
                records.sort_by_key(|r| Reverse(r.created_at.unwrap_or(i64::MIN)));

                let online = Status::success("Database Online");
                {
                    let mut s = mgr.state().lock().await;
                    if s.epoch != epoch {
                        debug!("Discarding snapshot delivered to a superseded session");
                        return;
                    }
                    s.records = records.clone();
                    s.data_status = online.clone();
                }
                debug!("Projection rebuilt with {} records", records.len());
                mgr.emit(SessionEvent::DataStatus(online));
                mgr.emit(SessionEvent::RecordsUpdated(records));
            }
            SnapshotEvent::Error(e) if e.is_permission_denied() => {
                warn!("Record subscription denied: {}", e);
                let denied = Status::denied("Access Blocked");
                {
                    let mut s = mgr.state().lock().await;
                    if s.epoch != epoch {
                        return;
                    }
                    s.data_status = denied.clone();
                }
                mgr.emit(SessionEvent::DataStatus(denied));
                // Terminal for this session; a new configuration restarts
                // the whole pipeline.
                return;
            }
            SnapshotEvent::Error(e) => {
                warn!("Record subscription error (non-fatal): {}", e);
            }
        }
    }
    debug!("Record subscription closed");
}
