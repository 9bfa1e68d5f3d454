use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::http::connection::{Connection, Limits};
use crate::http::handler::Handler;

/// A running server.
///
/// Each accepted connection gets its own task and its own buffer, parser and
/// writer; nothing is shared between connections except the handler.
pub struct Server {
    local_addr: SocketAddr,
    closing: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    accept_task: JoinHandle<()>,
}

/// Listens on every interface at `port` with default limits.
pub async fn serve<H: Handler>(port: u16, handler: H) -> anyhow::Result<Server> {
    Server::bind(("0.0.0.0", port), Limits::default(), handler).await
}

impl Server {
    pub async fn bind<A, H>(addr: A, limits: Limits, handler: H) -> anyhow::Result<Self>
    where
        A: ToSocketAddrs,
        H: Handler,
    {
        let listener = TcpListener::bind(addr)
            .await
            .context("Failed to bind listener")?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let closing = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(Notify::new());
        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::new(handler),
            limits,
            Arc::clone(&closing),
            Arc::clone(&shutdown),
        ));

        Ok(Self {
            local_addr,
            closing,
            shutdown,
            accept_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting and closes the listening socket. Connections already
    /// being served run to completion on their own.
    pub async fn close(self) -> anyhow::Result<()> {
        self.closing.store(true, Ordering::SeqCst);
        self.shutdown.notify_one();
        self.accept_task
            .await
            .context("Accept loop panicked")?;
        Ok(())
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    handler: Arc<H>,
    limits: Limits,
    closing: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
) {
    while !closing.load(Ordering::SeqCst) {
        let accepted = tokio::select! {
            res = listener.accept() => res,
            _ = shutdown.notified() => break,
        };

        let (socket, peer) = match accepted {
            Ok(ok) => ok,
            Err(_) if closing.load(Ordering::SeqCst) => break,
            Err(e) => {
                error!(error = %e, "Accept failed");
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            let conn = Connection::new(socket, limits);
            match conn.run(handler.as_ref()).await {
                Ok(()) => tracing::debug!(%peer, "Connection closed"),
                Err(e) if e.status().is_some() => {
                    warn!("Rejected request from {}: {}", peer, e)
                }
                Err(e) => error!("Connection error from {}: {}", peer, e),
            }
        });
    }

    drop(listener);
    info!("Listener closed");
}
