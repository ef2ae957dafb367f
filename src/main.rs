use actix::prelude::*;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use courier_dispatch::actors::{CoordinatorActor, GetHealthMonitor, Shutdown};
use courier_dispatch::adapters::{InMemoryStorage, ResilientGeocoder, StreetTableGeocoder};
use courier_dispatch::application::{register_courier, PlaceOrder, PlaceOrderHandler, PlaceOrderOutcome};
use courier_dispatch::config::{AppConfig, CliArgs};
use courier_dispatch::domain::Classify;
use courier_dispatch::metrics::{self, Metrics};
use courier_dispatch::utils::CircuitBreaker;

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=courier_dispatch=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,courier_dispatch=debug")),
        )
        .init();

    tracing::info!("🚀 Starting courier dispatch");

    // === 1. Configuration ===
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(port) = args.metrics_port {
        config.metrics.port = port;
    }
    match args.config {
        Some(ref path) => tracing::info!("📁 Configuration loaded from {}", path.display()),
        None => tracing::info!("📁 No config file given, using defaults"),
    }

    // === 2. Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);

    // === 3. Storage and seed couriers ===
    let storage = Arc::new(InMemoryStorage::new());
    for seed in &config.couriers {
        register_courier(storage.as_ref(), &seed.name, &seed.transport, seed.x, seed.y).await?;
    }
    tracing::info!(couriers = config.couriers.len(), "Couriers seeded");

    // === 4. Geocoding (street table behind retry + circuit breaker) ===
    let table = StreetTableGeocoder::from_table(
        &config.geocoding.streets,
        config.geocoding.fallback_random,
    )?;
    tracing::info!(
        streets = table.len(),
        fallback_random = config.geocoding.fallback_random,
        "Street table loaded"
    );
    let breaker = CircuitBreaker::new("geocoder", (&config.geocoding.circuit_breaker).into());
    let geocoder = ResilientGeocoder::new(table, (&config.geocoding.retry).into(), breaker.clone());
    let place_order = PlaceOrderHandler::new(storage.clone(), Arc::new(geocoder), metrics.clone());

    // === 5. Demo orders ===
    if args.demo_orders > 0 {
        place_demo_orders(&place_order, &config, args.demo_orders).await;
    }

    // === 6. Coordinator with both control loops ===
    let coordinator = CoordinatorActor::new(
        storage.clone(),
        metrics.clone(),
        Some(breaker),
        config.scheduler.clone(),
    )
    .start();

    // === 7. Operational endpoint ===
    if config.metrics.enabled {
        let health = coordinator
            .send(GetHealthMonitor)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Health monitor was not started"))?;
        let registry = metrics.registry().clone();
        let port = config.metrics.port;

        actix::spawn(async move {
            if let Err(e) = metrics::start_metrics_server(registry, health, port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    tracing::info!("⏳ Running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    tracing::info!("Ctrl-C received, shutting down");
    coordinator.send(Shutdown).await?;
    System::current().stop();

    tracing::info!("👋 Courier dispatch stopped");
    Ok(())
}

async fn place_demo_orders(handler: &PlaceOrderHandler, config: &AppConfig, count: usize) {
    let streets = config.street_names();

    for i in 0..count {
        let street = match streets.is_empty() {
            true => format!("Demo street {}", i + 1),
            false => streets[i % streets.len()].clone(),
        };

        let command = match PlaceOrder::new(Uuid::now_v7(), street, 1) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping invalid demo order");
                continue;
            }
        };

        match handler.handle(command).await {
            Ok(PlaceOrderOutcome::Created(_)) => {}
            Ok(PlaceOrderOutcome::AlreadyExists(order_id)) => {
                tracing::debug!(order_id = %order_id, "Demo order already placed");
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.code(), "Demo order rejected");
            }
        }
    }
}
