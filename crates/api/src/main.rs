#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scanrelay_observability::init();

    let config = scanrelay_api::config::AppConfig::from_env();
    tracing::info!(workers = config.workers, bind = %config.bind_addr, "starting scanrelay");

    let (app, _pool) = scanrelay_api::app::bootstrap(config.clone()).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
