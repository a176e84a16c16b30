use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{Instrument, info, warn};

use crate::config::ServerConfig;
use crate::http::connection::Connection;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::pool::{PoolError, WorkerPool};

/// An accepted connection waiting for a worker.
#[derive(Debug)]
pub struct ConnectionTask {
    pub stream: TcpStream,
    pub peer: SocketAddr,
    pub config: Arc<ServerConfig>,
}

/// The acceptor: owns the listening socket and the worker pool.
pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    pool: WorkerPool<ConnectionTask>,
}

impl Server {
    /// Binds the listener and starts the workers.
    ///
    /// When port 0 is requested the bound port becomes the config's
    /// `bind_port`, so the expected `Host` matches the real address. The
    /// resources root is made absolute here once.
    pub async fn bind(mut config: ServerConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind((config.bind_host.as_str(), config.bind_port))
            .await
            .with_context(|| format!("binding {}:{}", config.bind_host, config.bind_port))?;
        let local_addr = listener.local_addr()?;

        config.bind_port = local_addr.port();
        config.resources_dir = std::path::absolute(&config.resources_dir)
            .with_context(|| format!("resolving {}", config.resources_dir.display()))?;

        let config = Arc::new(config);
        let pool = WorkerPool::new(config.worker_count, config.queue_capacity(), serve_connection);

        info!(
            address = %local_addr,
            workers = pool.worker_count(),
            queue_capacity = pool.capacity(),
            resources = %config.resources_dir.display(),
            "Listening"
        );

        Ok(Self {
            listener,
            config,
            pool,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }

    /// Accepts connections until the future is dropped.
    ///
    /// Connections arriving while the queue is full are answered with 503
    /// right here and never reach a worker.
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
            };
            info!(%peer, "Accepted connection");

            let task = ConnectionTask {
                stream,
                peer,
                config: Arc::clone(&self.config),
            };

            match self.pool.submit(task) {
                Ok(()) => {}
                Err(PoolError::Saturated(task)) => {
                    warn!(%peer, "Worker pool queue is full, rejecting connection");
                    reject_saturated(task).await;
                }
                Err(e @ PoolError::Closed(_)) => {
                    return Err(anyhow::anyhow!("{}", e));
                }
            }
        }
    }
}

/// Binds and serves until an error ends the accept loop.
pub async fn run(cfg: ServerConfig) -> anyhow::Result<()> {
    Server::bind(cfg).await?.run().await
}

/// Worker entry point. The session runs in its own task so a panic inside
/// it drops the socket without taking the worker down.
async fn serve_connection(worker: usize, task: ConnectionTask) {
    let span = tracing::info_span!("conn", worker, peer = %task.peer);

    let session = tokio::spawn(
        async move {
            let mut conn = Connection::new(task.stream, task.config);
            conn.run().await;
        }
        .instrument(span),
    );

    if let Err(e) = session.await {
        tracing::error!(worker, error = %e, "Connection task failed");
    }
}

async fn reject_saturated(mut task: ConnectionTask) {
    let limits = &task.config.limits;
    let response = Response::service_unavailable(limits.retry_after_secs);
    let mut writer = ResponseWriter::new(&response, false, limits);

    if let Err(e) = writer.write_to_stream(&mut task.stream).await {
        tracing::debug!(peer = %task.peer, error = %e, "Failed to send 503");
    }
    let _ = task.stream.shutdown().await;
}
