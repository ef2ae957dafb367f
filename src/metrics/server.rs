use actix::Addr;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::actors::{GetSystemHealth, HealthMonitorActor, HealthStatus};

struct ServerState {
    registry: Registry,
    health: Addr<HealthMonitorActor>,
}

/// Start the operational HTTP server (`/metrics`, `/health`)
pub async fn start_metrics_server(
    registry: Registry,
    health: Addr<HealthMonitorActor>,
    port: u16,
) -> std::io::Result<()> {
    tracing::info!("📊 Starting metrics server on http://0.0.0.0:{}/metrics", port);

    let state = web::Data::new(ServerState { registry, health });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/metrics", web::get().to(metrics_handler))
            .route("/health", web::get().to(health_handler))
    })
    .workers(1)
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn metrics_handler(state: web::Data<ServerState>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().body(e.to_string());
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler(state: web::Data<ServerState>) -> impl Responder {
    match state.health.send(GetSystemHealth).await {
        Ok(health) => {
            let body = serde_json::json!({
                "service": "courier-dispatch",
                "health": &health,
            });
            match health.overall_status {
                HealthStatus::Unhealthy(_) => HttpResponse::ServiceUnavailable().json(body),
                HealthStatus::Healthy | HealthStatus::Degraded(_) => HttpResponse::Ok().json(body),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Health monitor unreachable");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "service": "courier-dispatch",
                "status": "unhealthy",
                "reason": "health monitor unreachable",
            }))
        }
    }
}
