use crate::domain::errors::{Classify, ErrorKind};

// ============================================================================
// Courier Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CourierError {
    #[error("Courier name cannot be empty")]
    EmptyName,

    #[error("Cannot assign an order to a courier that is already busy")]
    AlreadyBusy,
}

impl Classify for CourierError {
    fn kind(&self) -> ErrorKind {
        match self {
            CourierError::EmptyName => ErrorKind::Validation,
            CourierError::AlreadyBusy => ErrorKind::Conflict,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            CourierError::EmptyName => "courier.name.is.required",
            CourierError::AlreadyBusy => "courier.cant.assign.order.when.courier.is.busy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("Unknown transport id {0}, expected one of: 1, 2, 3")]
    UnknownId(i32),

    #[error("Unknown transport '{0}', expected one of: pedestrian, bicycle, car")]
    UnknownName(String),
}

impl Classify for TransportError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NotFound
    }

    fn code(&self) -> &'static str {
        "transport.is.wrong"
    }
}
