#![allow(dead_code)]

pub mod fake_backend;

use std::time::Duration;

use ledgerlog_core::core::SessionEvent;
use tokio::sync::broadcast;
use tokio::time::timeout;

/// Await the next event matching `pred`, with a timeout so a missing
/// transition becomes a readable failure instead of a hang.
pub async fn wait_for<F>(rx: &mut broadcast::Receiver<SessionEvent>, mut pred: F) -> SessionEvent
where
    F: FnMut(&SessionEvent) -> bool,
{
    timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(e) => panic!("event channel closed unexpectedly: {e}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a session event")
}

pub fn init_test_logging() {
    //   Logs will appear only when you run with `-- --nocapture`
    //   or when the test fails.
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
