#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use lexrelay_server::{build_router, config::ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lexrelay_server=debug,lexrelay_core=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting LexRelay server");

    let config = ServerConfig::load()?;
    let app = build_router(&config);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|err| anyhow::anyhow!("Failed to bind {}: {}", address, err))?;

    tracing::info!(
        upstream = %config.upstream_url,
        model = %config.default_model,
        "LexRelay listening on http://{}",
        address
    );

    axum::serve(listener, app).await?;
    Ok(())
}
