use std::sync::Arc;

use log::{debug, info, warn};

use crate::backend::Connection;
use crate::config::Config;
use crate::core::connection_manager::ConnectionManager;
use crate::core::session::SessionEvent;
use crate::core::status::Status;
use crate::core::{sync, CANONICAL_PROJECT};

/// Runs the authentication handshake for one session.
///
/// The identity watch is subscribed before the sign-in call: the backend
/// delivers the resulting identity through that channel, not as the
/// return value of the handshake. `epoch` is the session this task was
/// started under; every result is checked against it so nothing delivered
/// after a configuration swap can touch the successor session.
pub(crate) async fn run(
    mgr: ConnectionManager,
    handle: Arc<dyn Connection>,
    config: Config,
    epoch: u64,
) {
    let mut identity_rx = handle.watch_identity().await;

    // Token credentials are scoped to the canonical host project. Against
    // any other project they produce an identity mismatch, and a manual
    // override means the user explicitly picked their own project, so
    // anonymous sign-in is the default in both cases.
    let use_token = mgr.auth_token().is_some()
        && config.project_id != CANONICAL_PROJECT
        && !mgr.override_active();

    let attempt = if use_token {
        info!("Signing in with the externally-issued token");
        handle
            .sign_in_with_token(mgr.auth_token().unwrap_or_default())
            .await
    } else {
        info!("Signing in anonymously to '{}'", config.project_id);
        handle.sign_in_anonymously().await
    };

    if let Err(e) = attempt {
        warn!("Handshake failed: {}", e);
        let reason = e.code().unwrap_or("Handshake Failed").to_string();
        let failed = Status::failed(reason);
        {
            let mut s = mgr.state().lock().await;
            if s.epoch != epoch {
                debug!("Discarding handshake failure for a superseded session");
                return;
            }
            s.auth_status = failed.clone();
        }
        mgr.emit(SessionEvent::AuthStatus(failed));
        return;
    }

    while let Some(identity) = identity_rx.recv().await {
        let identity_changed = {
            let mut s = mgr.state().lock().await;
            if s.epoch != epoch {
                debug!("Discarding identity delivered to a superseded session");
                return;
            }
            let changed = s.identity.as_ref() != Some(&identity);
            s.identity = Some(identity.clone());
            s.auth_status = Status::success("Anonymous Session Active");
            changed
        };
        info!("Identity established: '{}'", identity.uid);
        mgr.emit(SessionEvent::AuthStatus(Status::success("Anonymous Session Active")));
        mgr.emit(SessionEvent::IdentityChanged(identity));

        if identity_changed {
            // A standing record subscription belongs to the previous
            // identity; it is torn down before the replacement starts.
            {
                let mut s = mgr.state().lock().await;
                if s.epoch != epoch {
                    return;
                }
                if let Some(old) = s.sync_task.take() {
                    old.abort();
                }
            }
            let task = tokio::spawn(sync::run(mgr.clone(), handle.clone(), epoch));
            let mut s = mgr.state().lock().await;
            if s.epoch == epoch {
                s.sync_task = Some(task);
            } else {
                task.abort();
                return;
            }
        }
    }
    debug!("Identity watch closed");
}
