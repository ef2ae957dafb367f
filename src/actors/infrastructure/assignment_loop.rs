use actix::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::actors::core::{GracefulStop, HealthStatus, SupervisedActor};
use crate::application::{AssignOrderError, AssignOrderHandler, AssignOutcome};
use crate::domain::errors::{Classify, ErrorKind};
use crate::metrics::{Metrics, ASSIGNMENT_LOOP};
use super::{HealthMonitorActor, UpdateHealth};

// ============================================================================
// Assignment Loop Actor - matches one pending order per tick
// ============================================================================
//
// Triggers itself every `interval`. A trigger that fires while the previous
// tick is still running is skipped, so the loop never overlaps itself.
// Failures are reported and never stop the actor.
//
// ============================================================================

#[derive(Message)]
#[rtype(result = "Option<Result<AssignOutcome, AssignOrderError>>")]
pub struct RunAssignmentTick;

pub struct AssignmentLoopActor {
    handler: Arc<AssignOrderHandler>,
    interval: Duration,
    metrics: Arc<Metrics>,
    health: Option<Addr<HealthMonitorActor>>,
    in_flight: bool,
}

impl AssignmentLoopActor {
    pub fn new(
        handler: Arc<AssignOrderHandler>,
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

    fn report(&self, result: &Result<AssignOutcome, AssignOrderError>, elapsed: Duration) {
        let (outcome, status) = match result {
            Ok(AssignOutcome::Assigned { .. }) => {
                self.metrics.orders_assigned.inc();
                ("assigned", HealthStatus::Healthy)
            }
            Ok(AssignOutcome::NoPendingOrders) => {
                tracing::debug!("No pending orders");
                ("idle", HealthStatus::Healthy)
            }
            Err(e) if e.kind() == ErrorKind::Storage => {
                tracing::error!(error = %e, code = e.code(), "Assignment tick rolled back");
                (e.code(), HealthStatus::Degraded(e.to_string()))
            }
            Err(AssignOrderError::FreeCouriersWereNotFound) => {
                tracing::debug!("Pending order waits for a free courier");
                ("no_free_couriers", HealthStatus::Healthy)
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.code(), kind = %e.kind(), "Assignment tick failed");
                (e.code(), HealthStatus::Healthy)
            }
        };

        self.metrics.record_tick(ASSIGNMENT_LOOP, outcome, elapsed.as_secs_f64());

        if let Some(ref health) = self.health {
            health.do_send(UpdateHealth {
                component: Self::COMPONENT.to_string(),
                status,
                details: Some(outcome.to_string()),
            });
        }
    }
}

impl Actor for AssignmentLoopActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "AssignmentLoopActor started");

        ctx.run_interval(self.interval, |_act, ctx| {
            ctx.notify(RunAssignmentTick);
        });
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        tracing::info!("AssignmentLoopActor stopped");
    }
}

impl SupervisedActor for AssignmentLoopActor {
    const COMPONENT: &'static str = "assignment_loop";
}

impl Handler<RunAssignmentTick> for AssignmentLoopActor {
    type Result = ResponseActFuture<Self, Option<Result<AssignOutcome, AssignOrderError>>>;

    fn handle(&mut self, _: RunAssignmentTick, _: &mut Self::Context) -> Self::Result {
        if self.in_flight {
            tracing::debug!("Previous assignment tick still running, skipping");
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

impl Handler<GracefulStop> for AssignmentLoopActor {
    type Result = ();

    fn handle(&mut self, _: GracefulStop, ctx: &mut Self::Context) {
        tracing::info!("AssignmentLoopActor received stop signal");
        ctx.stop();
    }
}
