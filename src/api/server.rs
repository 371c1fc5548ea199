//! API server lifecycle: starts/stops the axum HTTP server that serves
//! the widget API to the static site.
//!
//! bind → spawn background task → return handle with shutdown channel.
//! An idle-session sweeper runs beside the server until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::api::router::api_router;
use crate::core_state::CoreState;

/// Interval between idle-session sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Metadata for a running API server.
#[derive(Debug, Clone, Serialize)]
pub struct ApiServerSession {
    pub session_id: String,
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running API server.
pub struct ApiServer {
    pub session: ApiServerSession,
    core: Arc<CoreState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    sweeper: JoinHandle<()>,
}

impl ApiServer {
    /// Shut down the server gracefully and tear down all chat sessions.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            self.sweeper.abort();
            self.core.clear_sessions();
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Start the API server on `addr` (port 0 picks an ephemeral port).
pub async fn start_server_on(core: Arc<CoreState>, addr: SocketAddr) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind API server: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    tracing::info!(%addr, "API server binding");

    let app = api_router(Arc::clone(&core));

    let session = ApiServerSession {
        session_id: Uuid::new_v4().to_string(),
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    let sweeper = tokio::spawn(sweep_idle_sessions(Arc::clone(&core)));

    Ok(ApiServer {
        session,
        core,
        shutdown_tx: Some(shutdown_tx),
        sweeper,
    })
}

async fn sweep_idle_sessions(core: Arc<CoreState>) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match core.evict_idle_sessions() {
            Ok(0) => {}
            Ok(evicted) => tracing::debug!(evicted, "Idle chat sessions swept"),
            Err(e) => tracing::warn!("Idle session sweep failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    use crate::config::ServerConfig;

    fn test_core() -> Arc<CoreState> {
        Arc::new(CoreState::new(ServerConfig::default()))
    }

    fn loopback() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let mut server = start_server_on(test_core(), loopback())
            .await
            .expect("server should start");

        assert!(!server.session.session_id.is_empty());
        assert!(server.session.port > 0);

        let url = format!("http://127.0.0.1:{}/api/health", server.session.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn chat_round_trip_over_http() {
        let mut server = start_server_on(test_core(), loopback())
            .await
            .expect("server should start");
        let base = format!("http://127.0.0.1:{}", server.session.port);
        let client = reqwest::Client::new();

        let created: serde_json::Value = client
            .post(format!("{base}/api/sessions"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();

        let resp = client
            .post(format!("{base}/api/sessions/{id}/messages"))
            .json(&serde_json::json!({ "text": "こんにちは" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::ACCEPTED);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_clears_sessions_and_is_idempotent() {
        let core = test_core();
        let mut server = start_server_on(Arc::clone(&core), loopback())
            .await
            .expect("server should start");
        let widget = core.create_session().unwrap();

        server.shutdown();
        server.shutdown();

        assert_eq!(core.session_count(), 0);
        assert!(widget.is_torn_down());
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_idle_sessions() {
        let core = Arc::new(CoreState::new(ServerConfig {
            session_idle_timeout: Duration::from_secs(90),
            ..ServerConfig::default()
        }));
        let mut server = start_server_on(Arc::clone(&core), loopback())
            .await
            .expect("server should start");
        let widget = core.create_session().unwrap();

        tokio::time::sleep(SWEEP_INTERVAL * 3).await;

        assert!(widget.is_torn_down());
        assert_eq!(core.session_count(), 0);
        server.shutdown();
    }
}
