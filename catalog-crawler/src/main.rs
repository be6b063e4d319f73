// Entry point: crawl in the background, serve the store over HTTP.

use anyhow::{Context, Result};
use catalog_crawler::prelude::*;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,catalog_crawler=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        start_url = %config.crawler.start_url,
        next_page_check = %config.crawler.next_page_check,
        "Configuration loaded"
    );

    let store = Arc::new(ProductStore::new());
    let source = HttpPageSource::new(config.fetch.clone()).context("Failed to build HTTP client")?;
    let automation =
        HtmlPageAutomation::new(source).with_poll_interval(config.crawler.poll_interval());
    let crawler = CatalogCrawler::new(automation, Arc::clone(&store), config.crawler.clone());

    let cancel = Arc::new(CancellationToken::new());
    let crawl = {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            // The outcome is recorded in the store and logged.
            let _ = crawler.run_and_record(&cancel).await;
        })
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, build_app(store))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cancel.cancel("server shutting down");
    let _ = crawl.await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
