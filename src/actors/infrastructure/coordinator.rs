use actix::prelude::*;
use std::sync::Arc;

use crate::actors::core::{stop_child, HealthStatus, SupervisedActor};
use crate::application::{AssignOrderHandler, DeliveryQueries, MoveCouriersHandler};
use crate::config::SchedulerConfig;
use crate::domain::courier::CourierStatus;
use crate::metrics::Metrics;
use crate::ports::Storage;
use crate::utils::CircuitBreaker;
use super::{
    AssignmentLoopActor, GetSystemHealth, HealthMonitorActor, MovementLoopActor, UpdateHealth,
};

// ============================================================================
// Coordinator Actor - Orchestrates all system actors
// ============================================================================
//
// Responsibilities:
// - Manages lifecycle of the two control loops and the health monitor
// - Logs a periodic system health summary
// - Logs periodic snapshots of couriers and active orders
// - Coordinates graceful shutdown
//
// Actor Hierarchy:
//   CoordinatorActor (Supervisor)
//   ├── HealthMonitorActor
//   ├── AssignmentLoopActor
//   └── MovementLoopActor
//
// ============================================================================

pub struct CoordinatorActor {
    storage: Arc<dyn Storage>,
    metrics: Arc<Metrics>,
    breaker: Option<CircuitBreaker>,
    scheduler: SchedulerConfig,
    health_monitor: Option<Addr<HealthMonitorActor>>,
    assignment_loop: Option<Addr<AssignmentLoopActor>>,
    movement_loop: Option<Addr<MovementLoopActor>>,
}

impl CoordinatorActor {
    pub fn new(
        storage: Arc<dyn Storage>,
        metrics: Arc<Metrics>,
        breaker: Option<CircuitBreaker>,
        scheduler: SchedulerConfig,
    ) -> Self {
        Self {
            storage,
            metrics,
            breaker,
            scheduler,
            health_monitor: None,
            assignment_loop: None,
            movement_loop: None,
        }
    }

    fn start_child_actors(&mut self) {
        tracing::info!("Starting supervised child actors");

        let health_monitor = HealthMonitorActor::new(
            self.breaker.clone(),
            self.metrics.clone(),
            self.scheduler.health_check_interval(),
        )
        .start();
        self.health_monitor = Some(health_monitor.clone());

        let assignment_loop = AssignmentLoopActor::new(
            Arc::new(AssignOrderHandler::new(self.storage.clone())),
            self.scheduler.assign_interval(),
            self.metrics.clone(),
            Some(health_monitor.clone()),
        )
        .start();
        self.assignment_loop = Some(assignment_loop);

        health_monitor.do_send(UpdateHealth {
            component: AssignmentLoopActor::COMPONENT.to_string(),
            status: HealthStatus::Healthy,
            details: Some("Assignment loop started".to_string()),
        });

        let movement_loop = MovementLoopActor::new(
            Arc::new(MoveCouriersHandler::new(self.storage.clone())),
            self.scheduler.move_interval(),
            self.metrics.clone(),
            Some(health_monitor.clone()),
        )
        .start();
        self.movement_loop = Some(movement_loop);

        health_monitor.do_send(UpdateHealth {
            component: MovementLoopActor::COMPONENT.to_string(),
            status: HealthStatus::Healthy,
            details: Some("Movement loop started".to_string()),
        });

        tracing::info!("✅ All supervised actors started successfully");
    }

    fn log_health_summary(&self) {
        let Some(ref health_monitor) = self.health_monitor else {
            return;
        };
        let health_monitor = health_monitor.clone();

        actix::spawn(async move {
            match health_monitor.send(GetSystemHealth).await {
                Ok(health) => match health.overall_status {
                    HealthStatus::Healthy => {
                        tracing::debug!("System health check: Healthy");
                    }
                    HealthStatus::Degraded(ref msg) => {
                        tracing::warn!("System health check: Degraded - {}", msg);
                    }
                    HealthStatus::Unhealthy(ref msg) => {
                        tracing::error!("System health check: Unhealthy - {}", msg);
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to get system health: {}", e);
                }
            }
        });
    }

    fn log_snapshot(&self) {
        let queries = DeliveryQueries::new(self.storage.clone());

        actix::spawn(async move {
            let couriers = match queries.list_couriers().await {
                Ok(couriers) => couriers,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read courier snapshot");
                    return;
                }
            };
            let orders = match queries.list_active_orders().await {
                Ok(orders) => orders,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read order snapshot");
                    return;
                }
            };

            let busy = couriers.iter().filter(|c| c.status == CourierStatus::Busy).count();
            tracing::info!(
                couriers = couriers.len(),
                busy_couriers = busy,
                active_orders = orders.len(),
                "Dispatch snapshot"
            );

            for courier in &couriers {
                tracing::debug!(
                    courier_id = %courier.id,
                    name = %courier.name,
                    transport = %courier.transport,
                    x = courier.location.x,
                    y = courier.location.y,
                    status = courier.status.as_str(),
                    "Courier"
                );
            }
            for order in &orders {
                tracing::debug!(
                    order_id = %order.id,
                    x = order.location.x,
                    y = order.location.y,
                    status = %order.status,
                    "Active order"
                );
            }
        });
    }
}

impl Actor for CoordinatorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("🎯 CoordinatorActor started");
        self.start_child_actors();

        ctx.run_interval(self.scheduler.health_check_interval(), |act, _ctx| {
            act.log_health_summary();
        });

        ctx.run_interval(self.scheduler.snapshot_interval(), |act, _ctx| {
            act.log_snapshot();
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        tracing::info!("🛑 CoordinatorActor stopping - initiating graceful shutdown");
        Running::Stop
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        tracing::info!("🛑 CoordinatorActor stopped");
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

impl Handler<Shutdown> for CoordinatorActor {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) {
        tracing::info!("Received shutdown signal");

        // Loops first so no tick reports to a stopped monitor
        stop_child(&self.assignment_loop);
        stop_child(&self.movement_loop);
        stop_child(&self.health_monitor);

        ctx.stop();
    }
}

#[derive(Message)]
#[rtype(result = "Option<Addr<HealthMonitorActor>>")]
pub struct GetHealthMonitor;

impl Handler<GetHealthMonitor> for CoordinatorActor {
    type Result = Option<Addr<HealthMonitorActor>>;

    fn handle(&mut self, _: GetHealthMonitor, _: &mut Self::Context) -> Self::Result {
        self.health_monitor.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStorage;
    use crate::domain::courier::{Courier, Transport};
    use crate::domain::order::{Order, OrderStatus};
    use crate::domain::shared_kernel::Location;
    use std::time::Duration;
    use uuid::Uuid;

    fn fast_scheduler() -> SchedulerConfig {
        SchedulerConfig {
            assign_interval_ms: 10,
            move_interval_ms: 20,
            health_check_interval_ms: 50,
            snapshot_interval_ms: 50,
        }
    }

    #[actix::test]
    async fn test_loops_deliver_order_end_to_end() {
        let storage = InMemoryStorage::new();
        let courier =
            Courier::create("Ivan", Transport::Bicycle, Location::new(1, 1).unwrap()).unwrap();
        let order = Order::create(Uuid::new_v4(), Location::new(4, 4).unwrap()).unwrap();

        let mut uow = storage.begin().await.unwrap();
        uow.couriers().add(courier).await.unwrap();
        uow.orders().add(order.clone()).await.unwrap();
        uow.commit().await.unwrap();
        drop(uow);

        let metrics = Arc::new(Metrics::new().unwrap());
        let coordinator =
            CoordinatorActor::new(Arc::new(storage.clone()), metrics.clone(), None, fast_scheduler())
                .start();

        let mut delivered = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let mut uow = storage.begin().await.unwrap();
            let stored = uow.orders().get(order.id()).await.unwrap().unwrap();
            if stored.status() == OrderStatus::Completed {
                delivered = true;
                break;
            }
        }
        assert!(delivered, "order was not delivered");
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(metrics.orders_assigned.get(), 1);
        assert_eq!(metrics.orders_completed.get(), 1);

        let health_monitor = coordinator.send(GetHealthMonitor).await.unwrap().unwrap();
        let health = health_monitor.send(GetSystemHealth).await.unwrap();
        assert!(health.components.contains_key(AssignmentLoopActor::COMPONENT));
        assert!(health.components.contains_key(MovementLoopActor::COMPONENT));

        coordinator.send(Shutdown).await.unwrap();
    }
}
