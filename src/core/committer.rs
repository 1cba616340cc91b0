use chrono::Local;
use log::{debug, info, warn};

use crate::backend::NewRecord;
use crate::core::connection_manager::ConnectionManager;
use crate::core::errors::ClientError;
use crate::core::session::SessionEvent;
use crate::core::RECORDS_PATH;

impl ConnectionManager {
    /// Appends one record to the remote collection.
    ///
    /// Silently returns when the trimmed content is empty, when no handle
    /// or identity is available, or when a commit is already in flight
    /// (callers disable the trigger off [`Self::is_committing`]). The
    /// commit timestamp and its display label are frozen here, at commit
    /// time. A backend rejection surfaces as `CommitRejected` and is not
    /// retried.
    pub async fn commit_record(&self, content: &str) -> Result<(), ClientError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(());
        }

        let handle = {
            let mut s = self.state().lock().await;
            if s.identity.is_none() {
                debug!("Commit skipped: no identity");
                return Ok(());
            }
            let Some(handle) = s.handle.clone() else {
                debug!("Commit skipped: no connection");
                return Ok(());
            };
            if s.commit_in_flight {
                debug!("Commit skipped: another commit is in flight");
                return Ok(());
            }
            s.commit_in_flight = true;
            handle
        };
        self.emit(SessionEvent::CommitBusy(true));

        let now = Local::now();
        let record = NewRecord {
            content: content.to_string(),
            created_at: now.timestamp_millis(),
            timestamp: now.format("%b %-d").to_string(),
        };

        let result = handle.append_record(&RECORDS_PATH, record).await;

        {
            let mut s = self.state().lock().await;
            s.commit_in_flight = false;
        }
        self.emit(SessionEvent::CommitBusy(false));

        match result {
            Ok(id) => {
                info!("Record committed as '{}'", id);
                Ok(())
            }
            Err(e) => {
                warn!("Commit rejected: {}", e);
                Err(ClientError::CommitRejected(e.to_string()))
            }
        }
    }
}
