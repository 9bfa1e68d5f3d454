//! Accepts connections one at a time and logs the request each one sends.

use tokio::net::TcpListener;
use tracing::{info, warn};

use httpwire::config::Config;
use httpwire::http::connection::{Connection, Limits};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = Config::load()?;
    let limits = Limits::from(&cfg.server);
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        let mut conn = Connection::new(socket, limits);

        let request = match conn.read_request().await {
            Ok(request) => request,
            Err(e) => {
                warn!("Bad request from {}: {}", peer, e);
                continue;
            }
        };

        info!(
            %peer,
            method = request.method(),
            path = request.target(),
            version = request.version(),
            "Request line"
        );
        for (name, value) in request.headers().iter() {
            info!("  {}: {}", name, value);
        }
        info!(len = request.body().len(), "Body: {}", String::from_utf8_lossy(request.body()));
    }
}
