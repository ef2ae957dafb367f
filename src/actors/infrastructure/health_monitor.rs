use actix::prelude::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::actors::core::{ComponentHealth, GracefulStop, HealthStatus, SupervisedActor};
use crate::metrics::Metrics;
use crate::utils::CircuitBreaker;

// ============================================================================
// Health Monitor Actor - Monitors system health
// ============================================================================
//
// Responsibilities:
// - Track the last reported status of every component
// - Poll the geocoder circuit breaker, when there is one
// - Aggregate system-wide health for /health and the coordinator
//
// ============================================================================

pub const GEOCODER_COMPONENT: &str = "geocoder";

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct UpdateHealth {
    pub component: String,
    pub status: HealthStatus,
    pub details: Option<String>,
}

#[derive(Message)]
#[rtype(result = "SystemHealth")]
pub struct GetSystemHealth;

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: HashMap<String, ComponentHealth>,
    pub check_time: DateTime<Utc>,
}

// ============================================================================
// Health Monitor Actor
// ============================================================================

pub struct HealthMonitorActor {
    components: HashMap<String, ComponentHealth>,
    breaker: Option<CircuitBreaker>,
    metrics: Arc<Metrics>,
    check_interval: Duration,
}

impl HealthMonitorActor {
    pub fn new(breaker: Option<CircuitBreaker>, metrics: Arc<Metrics>, check_interval: Duration) -> Self {
        Self {
            components: HashMap::new(),
            breaker,
            metrics,
            check_interval,
        }
    }

    fn compute_overall_status(&self) -> HealthStatus {
        let mut degraded_components = Vec::new();
        let mut unhealthy_components = Vec::new();

        for (name, health) in &self.components {
            match &health.status {
                HealthStatus::Unhealthy(msg) => {
                    unhealthy_components.push(format!("{}: {}", name, msg));
                }
                HealthStatus::Degraded(msg) => {
                    degraded_components.push(format!("{}: {}", name, msg));
                }
                HealthStatus::Healthy => {}
            }
        }

        // Stable output regardless of map order
        unhealthy_components.sort();
        degraded_components.sort();

        if !unhealthy_components.is_empty() {
            HealthStatus::Unhealthy(unhealthy_components.join(", "))
        } else if !degraded_components.is_empty() {
            HealthStatus::Degraded(degraded_components.join(", "))
        } else {
            HealthStatus::Healthy
        }
    }

    fn poll_breaker(&self, ctx: &mut Context<Self>) {
        let Some(breaker) = self.breaker.clone() else {
            return;
        };
        let metrics = self.metrics.clone();
        let addr = ctx.address();

        actix::spawn(async move {
            let state = breaker.get_state().await;
            metrics.update_circuit_breaker_state(state);

            addr.do_send(UpdateHealth {
                component: GEOCODER_COMPONENT.to_string(),
                status: HealthStatus::from(state),
                details: Some(format!("circuit {}", state.as_str())),
            });
        });
    }
}

impl Actor for HealthMonitorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("HealthMonitorActor started");

        self.poll_breaker(ctx);
        ctx.run_interval(self.check_interval, |act, ctx| act.poll_breaker(ctx));
    }
}

impl SupervisedActor for HealthMonitorActor {
    const COMPONENT: &'static str = "health_monitor";
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<UpdateHealth> for HealthMonitorActor {
    type Result = ();

    fn handle(&mut self, msg: UpdateHealth, _: &mut Self::Context) {
        let previous = self.components.get(&msg.component).map(|h| h.status.clone());
        if previous.as_ref() != Some(&msg.status) {
            tracing::debug!(
                component = %msg.component,
                status = ?msg.status,
                "Component health changed"
            );
        }

        let health = ComponentHealth::new(msg.component.clone(), msg.status).with_details(msg.details);
        self.components.insert(msg.component, health);
        self.metrics.health_status.set(self.compute_overall_status().as_gauge());
    }
}

impl Handler<GetSystemHealth> for HealthMonitorActor {
    type Result = MessageResult<GetSystemHealth>;

    fn handle(&mut self, _msg: GetSystemHealth, _: &mut Self::Context) -> Self::Result {
        MessageResult(SystemHealth {
            overall_status: self.compute_overall_status(),
            components: self.components.clone(),
            check_time: Utc::now(),
        })
    }
}

impl Handler<GracefulStop> for HealthMonitorActor {
    type Result = ();

    fn handle(&mut self, _: GracefulStop, ctx: &mut Self::Context) {
        tracing::info!("HealthMonitorActor received stop signal");
        ctx.stop();
    }
}
