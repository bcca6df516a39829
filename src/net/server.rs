// Snapshot HTTP endpoint
// Read-only view of the engine for a render client: GET /snapshot and GET /plots.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info};

use crate::dashboard::Dashboard;
use crate::engine::{EngineSnapshot, SyncEngine};
use crate::projection::Viewport;
use super::messages::ViewportQuery;

type SharedEngine = Arc<RwLock<SyncEngine>>;

async fn snapshot(State(engine): State<SharedEngine>) -> Json<EngineSnapshot> {
    Json(engine.read().await.snapshot())
}

async fn plots(
    State(engine): State<SharedEngine>,
    Query(query): Query<ViewportQuery>,
) -> Json<Dashboard> {
    let snapshot = engine.read().await.snapshot();
    Json(Dashboard::build(&snapshot, Viewport::from(query)))
}

/// Router with both endpoints.
pub fn router(engine: SharedEngine) -> Router {
    Router::new()
        .route("/snapshot", get(snapshot))
        .route("/plots", get(plots))
        .with_state(engine)
}

/// Running HTTP server
pub struct SnapshotServer {
    addr: SocketAddr,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl SnapshotServer {
    /// Bind `addr` and serve in a background task.
    pub async fn start(addr: SocketAddr, engine: SharedEngine) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            let shutdown = async move {
                shutdown_rx.recv().await;
            };
            if let Err(e) = axum::serve(listener, router(engine))
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("HTTP server error: {}", e);
            }
        });

        info!("Snapshot endpoint listening on http://{}", actual_addr);
        Ok(SnapshotServer {
            addr: actual_addr,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Address the server is listening on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }
}
