use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{Classify, ErrorKind};
use crate::domain::services::{DispatchError, DispatchService};
use crate::ports::{Storage, StoreError, UnitOfWork};

// ============================================================================
// Assign Order - one tick of the assignment loop
// ============================================================================
//
// Orchestrates: earliest Created order + free couriers → DispatchService →
// update both aggregates → single commit.
//
// Any failure rolls the unit of work back, leaving the order Created and the
// courier Free for the next tick.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    NoPendingOrders,
    Assigned { order_id: Uuid, courier_id: Uuid },
}

#[derive(Debug, thiserror::Error)]
pub enum AssignOrderError {
    #[error("Free couriers were not found")]
    FreeCouriersWereNotFound,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Classify for AssignOrderError {
    fn kind(&self) -> ErrorKind {
        match self {
            AssignOrderError::FreeCouriersWereNotFound => ErrorKind::NotFound,
            AssignOrderError::Dispatch(e) => e.kind(),
            AssignOrderError::Store(e) => e.kind(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AssignOrderError::FreeCouriersWereNotFound => "free.couriers.were.not.found",
            AssignOrderError::Dispatch(e) => e.code(),
            AssignOrderError::Store(e) => e.code(),
        }
    }
}

pub struct AssignOrderHandler {
    storage: Arc<dyn Storage>,
    dispatch: DispatchService,
}

impl AssignOrderHandler {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            dispatch: DispatchService::new(),
        }
    }

    pub async fn handle(&self) -> Result<AssignOutcome, AssignOrderError> {
        let mut uow = self.storage.begin().await?;

        match self.assign(uow.as_mut()).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::error!(error = %rollback_err, "Rollback failed after assignment error");
                }
                Err(e)
            }
        }
    }

    async fn assign(&self, uow: &mut dyn UnitOfWork) -> Result<AssignOutcome, AssignOrderError> {
        let Some(mut order) = uow.orders().get_earliest_created().await? else {
            return Ok(AssignOutcome::NoPendingOrders);
        };

        let mut couriers = uow.couriers().get_all_free().await?;
        if couriers.is_empty() {
            return Err(AssignOrderError::FreeCouriersWereNotFound);
        }

        let courier = self.dispatch.dispatch(&mut order, &mut couriers)?.clone();

        uow.orders().update(&order).await?;
        uow.couriers().update(&courier).await?;
        uow.commit().await?;

        tracing::info!(
            order_id = %order.id(),
            courier_id = %courier.id(),
            courier = courier.name(),
            destination = %order.location(),
            "🚚 Order assigned"
        );

        Ok(AssignOutcome::Assigned {
            order_id: order.id(),
            courier_id: courier.id(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStorage;
    use crate::domain::courier::{Courier, CourierStatus, Transport};
    use crate::domain::order::{Order, OrderStatus};
    use crate::domain::shared_kernel::Location;
    use chrono::{Duration, Utc};

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

    fn courier(name: &str, transport: Transport, x: i32, y: i32) -> Courier {
        Courier::create(name, transport, Location::new(x, y).unwrap()).unwrap()
    }

    fn order_at(x: i32, y: i32) -> Order {
        Order::create(Uuid::new_v4(), Location::new(x, y).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_tick_without_orders_is_noop() {
        let storage = InMemoryStorage::new();
        seed(&storage, vec![courier("Ivan", Transport::Car, 1, 1)], vec![]).await;

        let handler = AssignOrderHandler::new(Arc::new(storage));
        assert_eq!(handler.handle().await.unwrap(), AssignOutcome::NoPendingOrders);
    }

    #[tokio::test]
    async fn test_tick_assigns_fastest_courier() {
        let storage = InMemoryStorage::new();
        let bicycle = courier("Bicycle", Transport::Bicycle, 3, 3);
        let order = order_at(1, 1);
        seed(
            &storage,
            vec![
                courier("Car", Transport::Car, 10, 10),
                bicycle.clone(),
                courier("Pedestrian", Transport::Pedestrian, 4, 4),
            ],
            vec![order.clone()],
        )
        .await;

        let handler = AssignOrderHandler::new(Arc::new(storage.clone()));
        let outcome = handler.handle().await.unwrap();
        assert_eq!(
            outcome,
            AssignOutcome::Assigned {
                order_id: order.id(),
                courier_id: bicycle.id()
            }
        );

        let mut uow = storage.begin().await.unwrap();
        let stored_order = uow.orders().get(order.id()).await.unwrap().unwrap();
        let stored_courier = uow.couriers().get(bicycle.id()).await.unwrap().unwrap();
        assert_eq!(stored_order.status(), OrderStatus::Assigned);
        assert_eq!(stored_order.courier_id(), Some(bicycle.id()));
        assert_eq!(stored_courier.status(), CourierStatus::Busy);
        assert_eq!(uow.couriers().get_all_free().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_tick_without_free_couriers_mutates_nothing() {
        let storage = InMemoryStorage::new();
        let mut busy = courier("Busy", Transport::Car, 2, 2);
        busy.set_busy().unwrap();
        let order = order_at(5, 5);
        seed(&storage, vec![busy.clone()], vec![order.clone()]).await;

        let handler = AssignOrderHandler::new(Arc::new(storage.clone()));
        let err = handler.handle().await.unwrap_err();
        assert!(matches!(err, AssignOrderError::FreeCouriersWereNotFound));
        assert_eq!(err.code(), "free.couriers.were.not.found");

        let mut uow = storage.begin().await.unwrap();
        let stored = uow.orders().get(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Created);
        assert_eq!(stored.courier_id(), None);

        let stored_courier = uow.couriers().get(busy.id()).await.unwrap().unwrap();
        assert_eq!(stored_courier.status(), CourierStatus::Busy);
        assert_eq!(stored_courier.location(), busy.location());
    }

    #[tokio::test]
    async fn test_commit_failure_rolls_back_whole_tick() {
        let storage = InMemoryStorage::new();
        let ivan = courier("Ivan", Transport::Car, 2, 2);
        let order = order_at(5, 5);
        seed(&storage, vec![ivan.clone()], vec![order.clone()]).await;

        storage.fail_next_commit();
        let handler = AssignOrderHandler::new(Arc::new(storage.clone()));
        let err = handler.handle().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);

        {
            let mut uow = storage.begin().await.unwrap();
            let stored_order = uow.orders().get(order.id()).await.unwrap().unwrap();
            let stored_courier = uow.couriers().get(ivan.id()).await.unwrap().unwrap();
            assert_eq!(stored_order.status(), OrderStatus::Created);
            assert!(stored_courier.is_free());
        }

        // The next tick retries from scratch
        let outcome = handler.handle().await.unwrap();
        assert!(matches!(outcome, AssignOutcome::Assigned { .. }));
    }

    #[tokio::test]
    async fn test_one_order_per_tick_oldest_first() {
        let storage = InMemoryStorage::new();
        let now = Utc::now();
        let newer = Order::create_at(Uuid::new_v4(), Location::new(3, 3).unwrap(), now).unwrap();
        let older = Order::create_at(
            Uuid::new_v4(),
            Location::new(4, 4).unwrap(),
            now - Duration::seconds(10),
        )
        .unwrap();
        seed(
            &storage,
            vec![
                courier("Ivan", Transport::Car, 1, 1),
                courier("Petr", Transport::Car, 9, 9),
            ],
            vec![newer.clone(), older.clone()],
        )
        .await;

        let handler = AssignOrderHandler::new(Arc::new(storage.clone()));
        match handler.handle().await.unwrap() {
            AssignOutcome::Assigned { order_id, .. } => assert_eq!(order_id, older.id()),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let mut uow = storage.begin().await.unwrap();
        let pending = uow.orders().get_earliest_created().await.unwrap().unwrap();
        assert_eq!(pending.id(), newer.id());
    }

    #[tokio::test]
    async fn test_same_creation_time_assigns_first_inserted() {
        let storage = InMemoryStorage::new();
        let at = Utc::now();
        let first = Order::create_at(Uuid::new_v4(), Location::new(3, 3).unwrap(), at).unwrap();
        let second = Order::create_at(Uuid::new_v4(), Location::new(4, 4).unwrap(), at).unwrap();
        seed(
            &storage,
            vec![courier("Ivan", Transport::Car, 1, 1)],
            vec![first.clone(), second.clone()],
        )
        .await;

        let handler = AssignOrderHandler::new(Arc::new(storage));
        match handler.handle().await.unwrap() {
            AssignOutcome::Assigned { order_id, .. } => assert_eq!(order_id, first.id()),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
