mod routes;

use httpwire::config::Config;
use httpwire::http::connection::Limits;
use httpwire::proxy::Upstream;
use httpwire::server::Server;

use routes::Routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let upstream = cfg.proxy.as_ref().map(Upstream::from_config).transpose()?;

    let server = Server::bind(
        cfg.server.listen_addr.as_str(),
        Limits::from(&cfg.server),
        Routes::new(upstream),
    )
    .await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    server.close().await?;
    tracing::info!("Server gracefully stopped");
    Ok(())
}
