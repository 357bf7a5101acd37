use anyhow::Result;
use kube::Client;
use mdns_api::IngressRoute;
use mdns_discovery::ServiceIpResolver;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

mod config;
mod error;
mod handler;
mod route_sync_controller;
mod sink;
mod watch_cache;

use config::ControllerConfig;
use route_sync_controller::RouteSyncController;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("Starting mdns-controller...");

    let config = ControllerConfig::from_env()?;
    debug!("Loaded configuration: {:?}", config);

    let client = Client::try_default().await?;
    let resolver = ServiceIpResolver::new(client.clone(), config.router_label.clone());

    let (record_tx, record_rx) = mpsc::channel(config.record_channel_capacity);
    let (stop_tx, stop_rx) = watch::channel(false);

    let controller =
        RouteSyncController::<IngressRoute>::new(client.clone(), &resolver, record_tx, &config)
            .await?;
    info!("IngressRoute controller advertising {:?}", controller.ips());

    let sink = tokio::spawn(sink::log_records(record_rx));
    let mut controller_task = tokio::spawn(controller.run(stop_rx));

    tokio::select! {
        result = &mut controller_task => {
            error!("CRITICAL: IngressRoute controller exited unexpectedly: {:?}", result);
            result??;
            anyhow::bail!("IngressRoute controller exited unexpectedly without error")
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received, stopping controllers...");
            stop_tx.send_replace(true);
            if let Err(e) = controller_task.await? {
                error!("IngressRoute controller stopped with error: {}", e);
            }
        }
    }

    let published = sink.await?;
    info!("Shut down after publishing {} records", published);
    Ok(())
}

/// Text or JSON logs depending on RUST_LOG_FORMAT, filtered by RUST_LOG (default info)
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .compact()
                .init();
        }
    }
}
