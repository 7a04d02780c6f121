use anyhow::Context;

use socialnet_api::app::{build_app, services::AppServices};
use socialnet_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    socialnet_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = AppServices::from_config(&config)
        .await
        .context("failed to initialize storage")?;

    let app = build_app(services);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
