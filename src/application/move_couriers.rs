use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{Classify, ErrorKind};
use crate::domain::order::OrderError;
use crate::ports::{Storage, StoreError, UnitOfWork};

// ============================================================================
// Move Couriers - one tick of the movement loop
// ============================================================================
//
// Every courier with an Assigned order advances one movement step toward the
// destination. Arrival completes the order and frees the courier.
//
// The whole batch is one unit of work committed once at the end. The first
// failure aborts the batch and rolls back everything staged so far.
//
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Couriers that took a step this tick
    pub moved: usize,
    /// Orders delivered this tick
    pub completed: Vec<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum MoveCouriersError {
    #[error("No assigned orders")]
    NoAssignedOrders,

    #[error("Assigned order {order_id} has no courier id")]
    CourierIdIsNullOrEmpty { order_id: Uuid },

    #[error("Courier with id {0} was not found")]
    CourierWithIdWasNotFound(Uuid),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Classify for MoveCouriersError {
    fn kind(&self) -> ErrorKind {
        match self {
            MoveCouriersError::NoAssignedOrders => ErrorKind::NotFound,
            MoveCouriersError::CourierIdIsNullOrEmpty { .. } => ErrorKind::Conflict,
            MoveCouriersError::CourierWithIdWasNotFound(_) => ErrorKind::NotFound,
            MoveCouriersError::Order(e) => e.kind(),
            MoveCouriersError::Store(e) => e.kind(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            MoveCouriersError::NoAssignedOrders => "no.assigned.orders",
            MoveCouriersError::CourierIdIsNullOrEmpty { .. } => "courier.id.is.null.or.empty",
            MoveCouriersError::CourierWithIdWasNotFound(_) => "courier.with.id.was.not.found",
            MoveCouriersError::Order(e) => e.code(),
            MoveCouriersError::Store(e) => e.code(),
        }
    }
}

pub struct MoveCouriersHandler {
    storage: Arc<dyn Storage>,
}

impl MoveCouriersHandler {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn handle(&self) -> Result<MoveOutcome, MoveCouriersError> {
        let mut uow = self.storage.begin().await?;

        match Self::move_all(uow.as_mut()).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::error!(error = %rollback_err, "Rollback failed after movement error");
                }
                Err(e)
            }
        }
    }

    async fn move_all(uow: &mut dyn UnitOfWork) -> Result<MoveOutcome, MoveCouriersError> {
        let orders = uow.orders().get_all_assigned().await?;
        if orders.is_empty() {
            return Err(MoveCouriersError::NoAssignedOrders);
        }

        let mut outcome = MoveOutcome::default();

        for mut order in orders {
            let courier_id = order
                .courier_id()
                .ok_or(MoveCouriersError::CourierIdIsNullOrEmpty { order_id: order.id() })?;

            let mut courier = uow
                .couriers()
                .get(courier_id)
                .await?
                .ok_or(MoveCouriersError::CourierWithIdWasNotFound(courier_id))?;

            let destination = order.location();
            let from = courier.location();
            courier.go(&destination);

            tracing::debug!(
                courier_id = %courier_id,
                order_id = %order.id(),
                from = %from,
                to = %courier.location(),
                "Courier moved"
            );

            if courier.location() == destination {
                order.complete()?;
                courier.set_free();
                uow.orders().update(&order).await?;
                outcome.completed.push(order.id());

                tracing::info!(
                    order_id = %order.id(),
                    courier_id = %courier_id,
                    location = %destination,
                    "📦 Order delivered"
                );
            }

            uow.couriers().update(&courier).await?;
            outcome.moved += 1;
        }

        uow.commit().await?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStorage;
    use crate::domain::courier::{Courier, CourierStatus, Transport};
    use crate::domain::order::{Order, OrderStatus};
    use crate::domain::shared_kernel::Location;

    fn loc(x: i32, y: i32) -> Location {
        Location::new(x, y).unwrap()
    }

    /// Courier + order already assigned to each other
    fn assigned_pair(transport: Transport, from: Location, to: Location) -> (Courier, Order) {
        let mut courier = Courier::create("Ivan", transport, from).unwrap();
        let mut order = Order::create(Uuid::new_v4(), to).unwrap();
        order.assign(&courier).unwrap();
        courier.set_busy().unwrap();
        (courier, order)
    }

    async fn seed(storage: &InMemoryStorage, couriers: Vec<Courier>, orders: Vec<Order>) {
        let mut uow = storage.begin().await.unwrap();
        for c in couriers {
            uow.couriers().add(c).await.unwrap();
        }
        for o in orders {
            uow.orders().add(o).await.unwrap();
        }
        uow.commit().await.unwrap();
    }

    async fn load(storage: &InMemoryStorage, courier_id: Uuid, order_id: Uuid) -> (Courier, Order) {
        let mut uow = storage.begin().await.unwrap();
        let courier = uow.couriers().get(courier_id).await.unwrap().unwrap();
        let order = uow.orders().get(order_id).await.unwrap().unwrap();
        (courier, order)
    }

    #[tokio::test]
    async fn test_no_assigned_orders_is_reported() {
        let storage = InMemoryStorage::new();
        let handler = MoveCouriersHandler::new(Arc::new(storage));

        let err = handler.handle().await.unwrap_err();
        assert!(matches!(err, MoveCouriersError::NoAssignedOrders));
        assert_eq!(err.code(), "no.assigned.orders");
    }

    #[tokio::test]
    async fn test_bicycle_delivers_in_three_ticks() {
        let storage = InMemoryStorage::new();
        let (courier, order) = assigned_pair(Transport::Bicycle, loc(1, 1), loc(4, 4));
        seed(&storage, vec![courier.clone()], vec![order.clone()]).await;
        let handler = MoveCouriersHandler::new(Arc::new(storage.clone()));

        let expected = [loc(3, 1), loc(4, 2), loc(4, 4)];
        for (tick, position) in expected.iter().enumerate() {
            let outcome = handler.handle().await.unwrap();
            assert_eq!(outcome.moved, 1);

            let (stored_courier, stored_order) = load(&storage, courier.id(), order.id()).await;
            assert_eq!(stored_courier.location(), *position, "tick {}", tick + 1);

            if tick < 2 {
                assert!(outcome.completed.is_empty());
                assert_eq!(stored_order.status(), OrderStatus::Assigned);
                assert_eq!(stored_courier.status(), CourierStatus::Busy);
            } else {
                assert_eq!(outcome.completed, vec![order.id()]);
                assert_eq!(stored_order.status(), OrderStatus::Completed);
                assert_eq!(stored_courier.status(), CourierStatus::Free);
            }
        }

        // Nothing left to move
        assert!(matches!(
            handler.handle().await.unwrap_err(),
            MoveCouriersError::NoAssignedOrders
        ));
    }

    #[tokio::test]
    async fn test_missing_courier_aborts_batch_without_partial_persist() {
        let storage = InMemoryStorage::new();
        let (moving, moving_order) = assigned_pair(Transport::Car, loc(1, 1), loc(9, 9));
        let (ghost, ghost_order) = assigned_pair(Transport::Car, loc(5, 5), loc(6, 6));
        // Only the first courier is stored, so the second order points nowhere
        seed(&storage, vec![moving.clone()], vec![moving_order.clone(), ghost_order]).await;

        let handler = MoveCouriersHandler::new(Arc::new(storage.clone()));
        let err = handler.handle().await.unwrap_err();
        assert!(matches!(err, MoveCouriersError::CourierWithIdWasNotFound(id) if id == ghost.id()));

        let (stored, _) = load(&storage, moving.id(), moving_order.id()).await;
        assert_eq!(stored.location(), loc(1, 1));
    }

    #[tokio::test]
    async fn test_commit_failure_keeps_positions() {
        let storage = InMemoryStorage::new();
        let (courier, order) = assigned_pair(Transport::Pedestrian, loc(2, 2), loc(2, 3));
        seed(&storage, vec![courier.clone()], vec![order.clone()]).await;

        storage.fail_next_commit();
        let handler = MoveCouriersHandler::new(Arc::new(storage.clone()));
        let err = handler.handle().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);

        let (stored_courier, stored_order) = load(&storage, courier.id(), order.id()).await;
        assert_eq!(stored_courier.location(), loc(2, 2));
        assert_eq!(stored_order.status(), OrderStatus::Assigned);

        // Movement is deterministic, so the retried tick makes the same progress
        let outcome = handler.handle().await.unwrap();
        assert_eq!(outcome.completed, vec![order.id()]);
    }

    #[tokio::test]
    async fn test_courier_already_at_destination_completes_immediately() {
        let storage = InMemoryStorage::new();
        let (courier, order) = assigned_pair(Transport::Car, loc(7, 7), loc(7, 7));
        seed(&storage, vec![courier.clone()], vec![order.clone()]).await;

        let handler = MoveCouriersHandler::new(Arc::new(storage.clone()));
        let outcome = handler.handle().await.unwrap();
        assert_eq!(outcome.completed, vec![order.id()]);

        let (stored_courier, _) = load(&storage, courier.id(), order.id()).await;
        assert!(stored_courier.is_free());
    }
}
