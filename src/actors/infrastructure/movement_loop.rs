use actix::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::actors::core::{GracefulStop, HealthStatus, SupervisedActor};
use crate::application::{MoveCouriersError, MoveCouriersHandler, MoveOutcome};
use crate::domain::errors::Classify;
use crate::metrics::{Metrics, MOVEMENT_LOOP};
use super::{HealthMonitorActor, UpdateHealth};

// ============================================================================
// Movement Loop Actor - advances every busy courier one step per tick
// ============================================================================

#[derive(Message)]
#[rtype(result = "Option<Result<MoveOutcome, MoveCouriersError>>")]
pub struct RunMovementTick;

pub struct MovementLoopActor {
    handler: Arc<MoveCouriersHandler>,
    interval: Duration,
    metrics: Arc<Metrics>,
    health: Option<Addr<HealthMonitorActor>>,
    in_flight: bool,
}

impl MovementLoopActor {
    pub fn new(
        handler: Arc<MoveCouriersHandler>,
        interval: Duration,
        metrics: Arc<Metrics>,
        health: Option<Addr<HealthMonitorActor>>,
    ) -> Self {
        Self {
            handler,
            interval,
            metrics,
            health,
            in_flight: false,
        }
    }

    fn report(&self, result: &Result<MoveOutcome, MoveCouriersError>, elapsed: Duration) {
        let (outcome, status) = match result {
            Ok(moved) => {
                self.metrics.record_movement(moved.moved, moved.completed.len());
                tracing::debug!(moved = moved.moved, completed = moved.completed.len(), "Movement tick committed");
                ("moved", HealthStatus::Healthy)
            }
            Err(MoveCouriersError::NoAssignedOrders) => {
                tracing::debug!("No assigned orders to move");
                ("idle", HealthStatus::Healthy)
            }
            // Broken references and storage failures need attention; the
            // batch was rolled back and will be retried next tick
            Err(e) => {
                tracing::error!(error = %e, code = e.code(), kind = %e.kind(), "Movement tick rolled back");
                (e.code(), HealthStatus::Degraded(e.to_string()))
            }
        };

        self.metrics.record_tick(MOVEMENT_LOOP, outcome, elapsed.as_secs_f64());

        if let Some(ref health) = self.health {
            health.do_send(UpdateHealth {
                component: Self::COMPONENT.to_string(),
                status,
                details: Some(outcome.to_string()),
            });
        }
    }
}

impl Actor for MovementLoopActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "MovementLoopActor started");

        ctx.run_interval(self.interval, |_act, ctx| {
            ctx.notify(RunMovementTick);
        });
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        tracing::info!("MovementLoopActor stopped");
    }
}

impl SupervisedActor for MovementLoopActor {
    const COMPONENT: &'static str = "movement_loop";
}

impl Handler<RunMovementTick> for MovementLoopActor {
    type Result = ResponseActFuture<Self, Option<Result<MoveOutcome, MoveCouriersError>>>;

    fn handle(&mut self, _: RunMovementTick, _: &mut Self::Context) -> Self::Result {
        if self.in_flight {
            tracing::debug!("Previous movement tick still running, skipping");
            return Box::pin(fut::ready(None));
        }
        self.in_flight = true;

        let handler = self.handler.clone();
        let started = Instant::now();

        Box::pin(
            async move { handler.handle().await }
                .into_actor(self)
                .map(move |result, act, _ctx| {
                    act.in_flight = false;
                    act.report(&result, started.elapsed());
                    Some(result)
                }),
        )
    }
}

impl Handler<GracefulStop> for MovementLoopActor {
    type Result = ();

    fn handle(&mut self, _: GracefulStop, ctx: &mut Self::Context) {
        tracing::info!("MovementLoopActor received stop signal");
        ctx.stop();
    }
}
