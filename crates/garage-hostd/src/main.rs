mod core;
mod http;
mod socket;
mod world;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, RwLock};

use garage_proto::protocol::HostPush;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hyper=warn,axum=warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_filter.as_str())
        .init();

    let config = garage_proto::config::Config::load().unwrap_or_default();
    tracing::info!("garage-hostd starting");

    let world = Arc::new(RwLock::new(world::World::seed()));
    let (push_tx, _) = broadcast::channel::<HostPush>(64);
    let (event_tx, event_rx) = mpsc::channel::<core::HostEvent>(256);

    socket::start_server(
        config.hostd.bind_address.clone(),
        config.hostd.push_port,
        world.clone(),
        push_tx.clone(),
    );
    http::start_server(
        config.hostd.bind_address.clone(),
        config.hostd.command_port,
        event_tx,
    );

    core::HostCore::new(
        world,
        event_rx,
        push_tx,
        Duration::from_secs(config.hostd.delta_interval_secs),
    )
    .run()
    .await;

    Ok(())
}
