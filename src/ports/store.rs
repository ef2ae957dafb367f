use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::errors::{Classify, ErrorKind};
use crate::domain::order::Order;

// ============================================================================
// Storage Ports
// ============================================================================
//
// The core never talks to a database directly. Every use case opens one unit
// of work, reads and stages writes through the two repositories it exposes,
// and finishes with `commit` (or `rollback`). Dropping a unit of work without
// committing discards whatever was staged after the last `save_changes`.
//
// Adapters must make a unit of work a consistent snapshot for its whole
// lifetime and apply its writes all-or-nothing.
//
// ============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: Uuid },

    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: Uuid },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl Classify for StoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Duplicate { .. } => ErrorKind::Conflict,
            StoreError::Missing { .. } => ErrorKind::NotFound,
            StoreError::Unavailable(_) => ErrorKind::Storage,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            StoreError::Duplicate { .. } => "store.duplicate",
            StoreError::Missing { .. } => "store.missing",
            StoreError::Unavailable(_) => "store.unavailable",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait OrderStore: Send {
    async fn add(&mut self, order: Order) -> StoreResult<()>;

    async fn update(&mut self, order: &Order) -> StoreResult<()>;

    async fn get(&mut self, id: Uuid) -> StoreResult<Option<Order>>;

    /// Oldest order still in Created status (ties: insertion order)
    async fn get_earliest_created(&mut self) -> StoreResult<Option<Order>>;

    async fn get_all_assigned(&mut self) -> StoreResult<Vec<Order>>;

    /// Created and Assigned orders, in insertion order
    async fn get_all_not_completed(&mut self) -> StoreResult<Vec<Order>>;
}

#[async_trait]
pub trait CourierStore: Send {
    async fn add(&mut self, courier: Courier) -> StoreResult<()>;

    async fn update(&mut self, courier: &Courier) -> StoreResult<()>;

    async fn get(&mut self, id: Uuid) -> StoreResult<Option<Courier>>;

    async fn get_all_free(&mut self) -> StoreResult<Vec<Courier>>;

    async fn get_all(&mut self) -> StoreResult<Vec<Courier>>;
}

#[async_trait]
pub trait TransactionScope: Send {
    /// Persist staged writes; the scope stays open
    async fn save_changes(&mut self) -> StoreResult<()>;

    /// Persist staged writes and close the scope
    async fn commit(&mut self) -> StoreResult<()>;

    /// Discard writes staged since the last save
    async fn rollback(&mut self) -> StoreResult<()>;
}

/// One tick's worth of storage access
pub trait UnitOfWork: TransactionScope {
    fn orders(&mut self) -> &mut dyn OrderStore;

    fn couriers(&mut self) -> &mut dyn CourierStore;
}

/// Entry point adapters implement
#[async_trait]
pub trait Storage: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
}
