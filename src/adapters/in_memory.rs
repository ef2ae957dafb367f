use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::order::{Order, OrderStatus};
use crate::ports::{
    CourierStore, OrderStore, Storage, StoreError, StoreResult, TransactionScope, UnitOfWork,
};

// ============================================================================
// In-Memory Storage
// ============================================================================
//
// Committed state lives behind one async mutex. `begin` takes the lock for
// the whole lifetime of the unit of work, so ticks are serialized and every
// unit of work reads a consistent snapshot. Writes go to a working copy and
// only reach committed state on `save_changes` / `commit`.
//
// ============================================================================

#[derive(Debug, Default, Clone)]
struct OrderTable {
    rows: Vec<Order>,
}

#[derive(Debug, Default, Clone)]
struct CourierTable {
    rows: Vec<Courier>,
}

#[derive(Debug, Default, Clone)]
struct State {
    orders: OrderTable,
    couriers: CourierTable,
}

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    state: Arc<Mutex<State>>,
    fail_next_commit: Arc<AtomicBool>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `commit` fail with `StoreError::Unavailable`
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let working = State::clone(&guard);

        Ok(Box::new(InMemoryUnitOfWork {
            guard: Some(guard),
            working,
            fail_next_commit: self.fail_next_commit.clone(),
        }))
    }
}

pub struct InMemoryUnitOfWork {
    guard: Option<OwnedMutexGuard<State>>,
    working: State,
    fail_next_commit: Arc<AtomicBool>,
}

impl InMemoryUnitOfWork {
    fn committed(&mut self) -> StoreResult<&mut OwnedMutexGuard<State>> {
        self.guard
            .as_mut()
            .ok_or_else(|| StoreError::Unavailable("unit of work already closed".to_string()))
    }
}

#[async_trait]
impl TransactionScope for InMemoryUnitOfWork {
    async fn save_changes(&mut self) -> StoreResult<()> {
        let working = self.working.clone();
        let committed = self.committed()?;
        **committed = working;
        Ok(())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("commit rejected".to_string()));
        }

        self.save_changes().await?;
        self.guard = None;
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        let restored = State::clone(self.committed()?);
        self.working = restored;
        Ok(())
    }
}

impl UnitOfWork for InMemoryUnitOfWork {
    fn orders(&mut self) -> &mut dyn OrderStore {
        &mut self.working.orders
    }

    fn couriers(&mut self) -> &mut dyn CourierStore {
        &mut self.working.couriers
    }
}

// ============================================================================
// Repositories over the working copy
// ============================================================================

#[async_trait]
impl OrderStore for OrderTable {
    async fn add(&mut self, order: Order) -> StoreResult<()> {
        if self.rows.iter().any(|o| o.id() == order.id()) {
            return Err(StoreError::Duplicate {
                entity: "order",
                id: order.id(),
            });
        }
        self.rows.push(order);
        Ok(())
    }

    async fn update(&mut self, order: &Order) -> StoreResult<()> {
        let slot = self
            .rows
            .iter_mut()
            .find(|o| o.id() == order.id())
            .ok_or(StoreError::Missing {
                entity: "order",
                id: order.id(),
            })?;
        *slot = order.clone();
        Ok(())
    }

    async fn get(&mut self, id: Uuid) -> StoreResult<Option<Order>> {
        Ok(self.rows.iter().find(|o| o.id() == id).cloned())
    }

    async fn get_earliest_created(&mut self) -> StoreResult<Option<Order>> {
        let earliest = self
            .rows
            .iter()
            .filter(|o| o.status() == OrderStatus::Created)
            .fold(None::<&Order>, |best, o| match best {
                Some(b) if b.created_at() <= o.created_at() => Some(b),
                _ => Some(o),
            });
        Ok(earliest.cloned())
    }

    async fn get_all_assigned(&mut self) -> StoreResult<Vec<Order>> {
        Ok(self
            .rows
            .iter()
            .filter(|o| o.status() == OrderStatus::Assigned)
            .cloned()
            .collect())
    }

    async fn get_all_not_completed(&mut self) -> StoreResult<Vec<Order>> {
        Ok(self
            .rows
            .iter()
            .filter(|o| o.status() != OrderStatus::Completed)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CourierStore for CourierTable {
    async fn add(&mut self, courier: Courier) -> StoreResult<()> {
        if self.rows.iter().any(|c| c.id() == courier.id()) {
            return Err(StoreError::Duplicate {
                entity: "courier",
                id: courier.id(),
            });
        }
        self.rows.push(courier);
        Ok(())
    }

    async fn update(&mut self, courier: &Courier) -> StoreResult<()> {
        let slot = self
            .rows
            .iter_mut()
            .find(|c| c.id() == courier.id())
            .ok_or(StoreError::Missing {
                entity: "courier",
                id: courier.id(),
            })?;
        *slot = courier.clone();
        Ok(())
    }

    async fn get(&mut self, id: Uuid) -> StoreResult<Option<Courier>> {
        Ok(self.rows.iter().find(|c| c.id() == id).cloned())
    }

    async fn get_all_free(&mut self) -> StoreResult<Vec<Courier>> {
        Ok(self.rows.iter().filter(|c| c.is_free()).cloned().collect())
    }

    async fn get_all(&mut self) -> StoreResult<Vec<Courier>> {
        Ok(self.rows.clone())
    }
}
