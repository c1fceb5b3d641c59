mod config;
mod error;
mod parser;
mod server;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use server::AptitudeQuizServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting aptitude-quiz MCP server");

    let config = Config::from_env()?;
    info!(
        catalog_path = config.catalog_path.as_deref().unwrap_or("<built-in>"),
        builtin_catalog = %config.builtin_catalog,
        label_max_length = config.label_limit.get(),
        compact_label_max_length = config.compact_label_limit.get(),
        "configuration loaded"
    );

    let catalog = parser::load_catalog(&config)?;
    info!(
        version = %catalog.version(),
        digest = %catalog.digest(),
        categories = catalog.dimension(),
        questions = catalog.question_count(),
        profiles = catalog.profiles().len(),
        "catalog loaded"
    );

    let tcp_listen_addr = config.tcp_listen_addr.clone();
    let server = AptitudeQuizServer::new(catalog, config);

    if let Some(addr) = tcp_listen_addr {
        let listener = TcpListener::bind(&addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                tracing::info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                tracing::info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
