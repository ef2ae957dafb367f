use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{Classify, ErrorKind};
use crate::domain::order::{Order, OrderError};
use crate::metrics::Metrics;
use crate::ports::{GeocodingClient, GeocodingError, Storage, StoreError};

// ============================================================================
// Place Order
// ============================================================================
//
// Idempotent on the order id: placing an id that already exists succeeds
// without touching it. The street is geocoded outside any unit of work so a
// slow geocoder never holds up the loops.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    order_id: Uuid,
    street: String,
    volume: i32,
}

impl PlaceOrder {
    pub fn new(order_id: Uuid, street: impl Into<String>, volume: i32) -> Result<Self, PlaceOrderError> {
        let street = street.into();
        if order_id.is_nil() {
            return Err(PlaceOrderError::EmptyOrderId);
        }
        if street.trim().is_empty() {
            return Err(PlaceOrderError::EmptyStreet);
        }
        if volume <= 0 {
            return Err(PlaceOrderError::InvalidVolume(volume));
        }
        Ok(Self {
            order_id,
            street,
            volume,
        })
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOrderOutcome {
    Created(Uuid),
    AlreadyExists(Uuid),
}

#[derive(Debug, thiserror::Error)]
pub enum PlaceOrderError {
    #[error("Order id cannot be empty")]
    EmptyOrderId,

    #[error("Street cannot be empty")]
    EmptyStreet,

    #[error("Volume must be positive, got {0}")]
    InvalidVolume(i32),

    #[error("Could not resolve delivery location: {0}")]
    LocationInvalid(#[source] GeocodingError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Classify for PlaceOrderError {
    fn kind(&self) -> ErrorKind {
        match self {
            PlaceOrderError::EmptyOrderId
            | PlaceOrderError::EmptyStreet
            | PlaceOrderError::InvalidVolume(_) => ErrorKind::Validation,
            PlaceOrderError::LocationInvalid(_) => ErrorKind::ExternalDependency,
            PlaceOrderError::Order(e) => e.kind(),
            PlaceOrderError::Store(e) => e.kind(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            PlaceOrderError::EmptyOrderId => "order.id.is.required",
            PlaceOrderError::EmptyStreet => "street.is.required",
            PlaceOrderError::InvalidVolume(_) => "volume.is.invalid",
            PlaceOrderError::LocationInvalid(_) => "location.is.invalid",
            PlaceOrderError::Order(e) => e.code(),
            PlaceOrderError::Store(e) => e.code(),
        }
    }
}

pub struct PlaceOrderHandler {
    storage: Arc<dyn Storage>,
    geocoder: Arc<dyn GeocodingClient>,
    metrics: Arc<Metrics>,
}

impl PlaceOrderHandler {
    pub fn new(
        storage: Arc<dyn Storage>,
        geocoder: Arc<dyn GeocodingClient>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            storage,
            geocoder,
            metrics,
        }
    }

    pub async fn handle(&self, command: PlaceOrder) -> Result<PlaceOrderOutcome, PlaceOrderError> {
        let order_id = command.order_id();

        if self.exists(order_id).await? {
            tracing::debug!(order_id = %order_id, "Order already placed");
            return Ok(PlaceOrderOutcome::AlreadyExists(order_id));
        }

        let location = match self.geocoder.resolve(command.street()).await {
            Ok(location) => location,
            Err(e) => {
                self.metrics.record_geocoding_failure(e.code());
                return Err(PlaceOrderError::LocationInvalid(e));
            }
        };

        let order = Order::create(order_id, location)?;

        let mut uow = self.storage.begin().await?;
        match uow.orders().add(order).await {
            Ok(()) => {}
            // Placed concurrently while we were geocoding
            Err(StoreError::Duplicate { .. }) => return Ok(PlaceOrderOutcome::AlreadyExists(order_id)),
            Err(e) => return Err(e.into()),
        }
        uow.commit().await?;
        self.metrics.orders_placed.inc();

        tracing::info!(
            order_id = %order_id,
            street = command.street(),
            volume = command.volume(),
            location = %location,
            "📝 Order placed"
        );

        Ok(PlaceOrderOutcome::Created(order_id))
    }

    async fn exists(&self, order_id: Uuid) -> Result<bool, StoreError> {
        let mut uow = self.storage.begin().await?;
        Ok(uow.orders().get(order_id).await?.is_some())
    }
}
