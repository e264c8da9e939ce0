use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Keep idle `/cable` sockets open through proxies by pinging them every
/// `every`. Stops when `cancel` fires.
pub fn start_heartbeat(
    ws_manager: Arc<WsManager>,
    every: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticks.tick() => {
                    if ws_manager.connection_count().await > 0 {
                        ws_manager.ping_all().await;
                    }
                }
            }
        }
        tracing::debug!("Heartbeat stopped");
    })
}

#[cfg(test)]
mod tests {
    use axum::extract::ws::Message;

    use super::*;

    #[tokio::test]
    async fn pings_connected_clients_until_cancelled() {
        let manager = Arc::new(WsManager::new());
        let mut rx = manager.add("client-1".to_string()).await;
        let cancel = CancellationToken::new();

        let handle = start_heartbeat(Arc::clone(&manager), Duration::from_millis(20), cancel.clone());

        let frame = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("ping within timeout")
            .expect("channel open");
        assert!(matches!(frame, Message::Ping(_)));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("heartbeat stops after cancel")
            .expect("heartbeat task did not panic");
    }
}
