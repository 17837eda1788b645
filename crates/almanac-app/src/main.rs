use std::sync::Arc;

use almanac_app::app::api::routes;
use almanac_app::depot::StateHandler;
use almanac_core::config::load_config;
use almanac_db::db::connection::create_pool;
use almanac_db::db::migrate::run_pending_migrations;
use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Almanac calendar server");

    let config = load_config()?;

    tracing::info!(
        bind_addr = %config.server.bind_addr(),
        auth_method = ?config.auth.method,
        safety_cap = config.expansion.safety_cap,
        "Configuration loaded"
    );

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    run_pending_migrations(&config.database.url).await?;

    let pool = create_pool(&config.database).await?;

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(StateHandler {
            provider: pool,
            settings: Arc::new(config),
        })
        .push(routes());

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
