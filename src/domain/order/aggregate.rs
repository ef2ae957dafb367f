use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::shared_kernel::Location;
use super::errors::OrderError;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Aggregate - Business Logic
// ============================================================================
//
// Invariant: courier_id is Some iff status is Assigned or Completed.
// Destination never changes after creation; orders are never deleted.
//
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    id: Uuid,
    location: Location,
    status: OrderStatus,
    courier_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl Order {
    fn new(id: Uuid, location: Location, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            location,
            status: OrderStatus::Created,
            courier_id: None,
            created_at,
        }
    }

    /// Validated factory. The id is supplied by the caller (the basket it
    /// came from), which is what makes placement idempotent.
    pub fn create(id: Uuid, location: Location) -> Result<Self, OrderError> {
        Self::create_at(id, location, Utc::now())
    }

    /// Same as `create` with an explicit creation time
    pub(crate) fn create_at(
        id: Uuid,
        location: Location,
        created_at: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if id.is_nil() {
            return Err(OrderError::EmptyId);
        }
        Ok(Self::new(id, location, created_at))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn courier_id(&self) -> Option<Uuid> {
        self.courier_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn assign(&mut self, courier: &Courier) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Created => {}
            OrderStatus::Assigned | OrderStatus::Completed => {
                return Err(OrderError::CantAssign(self.status));
            }
        }
        if let Some(courier_id) = self.courier_id {
            return Err(OrderError::CourierAlreadySet(courier_id));
        }

        self.courier_id = Some(courier.id());
        self.status = OrderStatus::Assigned;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Assigned {
            return Err(OrderError::CantCompleteNotAssigned(self.status));
        }
        self.status = OrderStatus::Completed;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
