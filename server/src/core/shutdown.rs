//! Graceful shutdown coordination

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use super::constants::SHUTDOWN_TIMEOUT_SECS;
use crate::data::DatastoreService;

/// Shared shutdown signal plus the background tasks that must drain before
/// the datastore is closed
#[derive(Clone)]
pub struct ShutdownService {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
    datastore: Arc<DatastoreService>,
}

impl ShutdownService {
    pub fn new(datastore: Arc<DatastoreService>) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
            handles: Arc::new(Mutex::new(Vec::new())),
            datastore,
        }
    }

    pub async fn register(&self, handle: JoinHandle<()>) {
        self.handles.lock().await.push(handle);
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Signal, drain registered tasks, then flush and close the datastore.
    ///
    /// The task worker finishes whatever is already queued before its handle
    /// resolves, so queued announcement refreshes still land in the store.
    pub async fn shutdown(&self) {
        self.trigger();
        self.drain_tasks(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS))
            .await;

        if let Err(e) = self.datastore.checkpoint().await {
            tracing::warn!(error = %e, "Final checkpoint failed");
        }
        self.datastore.close().await;
        tracing::debug!("Shutdown complete");
    }

    async fn drain_tasks(&self, timeout: Duration) {
        let handles = std::mem::take(&mut *self.handles.lock().await);
        let pending = handles.len();
        if tokio::time::timeout(timeout, futures::future::join_all(handles))
            .await
            .is_err()
        {
            tracing::warn!(
                pending,
                timeout_secs = timeout.as_secs(),
                "Background tasks did not stop in time"
            );
        } else {
            tracing::debug!(pending, "Background tasks stopped");
        }
    }

    /// Future that resolves once shutdown is triggered, for axum's
    /// `with_graceful_shutdown`
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.rx.clone();
        async move {
            let _ = rx.wait_for(|&stopped| stopped).await;
        }
    }

    /// Trigger shutdown on Ctrl+C or SIGTERM
    pub fn install_signal_handlers(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            let signal = os_signal().await;
            tracing::info!(signal, "Shutting down");
            service.trigger();
        });
    }
}

async fn os_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
