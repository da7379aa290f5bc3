mod app;
mod clicks;
mod config;
mod errors;
mod routes;
mod state;

use std::sync::Arc;

use aws_config::BehaviorVersion;
use mysfits_core::{DynamoStore, MemoryStore, MysfitStore, seed};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::clicks::{ClickSink, FirehoseClickSink, LogClickSink};
use crate::config::{Config, StoreBackend};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let aws = aws_config::defaults(BehaviorVersion::latest()).load().await;

    let mysfits: Arc<dyn MysfitStore> = match config.store {
        StoreBackend::DynamoDb => Arc::new(DynamoStore::with_client(
            aws_sdk_dynamodb::Client::new(&aws),
            &config.mysfits_table,
        )),
        StoreBackend::Memory => Arc::new(MemoryStore::with_mysfits(seed::default_catalog()?)),
    };

    let clicks: Arc<dyn ClickSink> = match &config.clicks_delivery_stream {
        Some(stream) => Arc::new(FirehoseClickSink::new(
            aws_sdk_firehose::Client::new(&aws),
            stream,
        )),
        None => Arc::new(LogClickSink),
    };

    let app = app::create_app(
        AppState::new(mysfits, clicks),
        config.request_timeout,
        config.permissive_cors,
    );

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        store = ?config.store,
        table = %config.mysfits_table,
        clicks_stream = config.clicks_delivery_stream.as_deref().unwrap_or("-"),
        "mysfits-api listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("mysfits-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
