use std::sync::Arc;

use anyhow::Context;

use stockledger_api::app;
use stockledger_infra::reporter::spawn_stats_reporter;
use stockledger_infra::{AppConfig, HttpGateway, JsonFileGateway, PersistenceGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    stockledger_observability::init(config.log_format);

    let (gateway, backend): (Arc<dyn PersistenceGateway>, String) = match &config.backend_url {
        Some(url) => (Arc::new(HttpGateway::new(url.clone())), url.clone()),
        None => (
            Arc::new(JsonFileGateway::new(&config.data_file)),
            config.data_file.display().to_string(),
        ),
    };
    let services = app::services::build_services(gateway)
        .await
        .with_context(|| format!("failed to load {backend}"))?;

    let reporter = config
        .refresh_interval
        .map(|every| spawn_stats_reporter(services.clone(), every));

    let app = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        backend = %backend,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    if let Some(reporter) = reporter {
        reporter.shutdown().await;
    }
    Ok(())
}
