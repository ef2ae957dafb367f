use uuid::Uuid;

use crate::domain::errors::{Classify, ErrorKind};
use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order id cannot be empty")]
    EmptyId,

    #[error("Cannot assign an order in status: {0}")]
    CantAssign(OrderStatus),

    #[error("Order is already assigned to courier {0}")]
    CourierAlreadySet(Uuid),

    #[error("Cannot complete an order that is not assigned (status: {0})")]
    CantCompleteNotAssigned(OrderStatus),
}

impl Classify for OrderError {
    fn kind(&self) -> ErrorKind {
        match self {
            OrderError::EmptyId => ErrorKind::Validation,
            _ => ErrorKind::Conflict,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            OrderError::EmptyId => "order.id.is.required",
            OrderError::CantAssign(OrderStatus::Assigned) => "order.cant.assign.assigned.order",
            OrderError::CantAssign(_) => "order.cant.assign.completed.order",
            OrderError::CourierAlreadySet(_) => "order.cant.assign.order.to.busy.courier",
            OrderError::CantCompleteNotAssigned(_) => "order.cant.completed.not.assigned.order",
        }
    }
}
