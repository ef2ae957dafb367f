use crate::domain::courier::{Courier, CourierError, Transport, TransportError};
use crate::domain::errors::{Classify, ErrorKind};
use crate::domain::shared_kernel::{Location, LocationError};
use crate::ports::{Storage, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum RegisterCourierError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Courier(#[from] CourierError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Classify for RegisterCourierError {
    fn kind(&self) -> ErrorKind {
        match self {
            RegisterCourierError::Transport(e) => e.kind(),
            RegisterCourierError::Location(e) => e.kind(),
            RegisterCourierError::Courier(e) => e.kind(),
            RegisterCourierError::Store(e) => e.kind(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            RegisterCourierError::Transport(e) => e.code(),
            RegisterCourierError::Location(e) => e.code(),
            RegisterCourierError::Courier(e) => e.code(),
            RegisterCourierError::Store(e) => e.code(),
        }
    }
}

/// Validate and store a new Free courier
pub async fn register_courier(
    storage: &dyn Storage,
    name: &str,
    transport_name: &str,
    x: i32,
    y: i32,
) -> Result<Courier, RegisterCourierError> {
    let transport = Transport::from_name(transport_name)?;
    let location = Location::new(x, y)?;
    let courier = Courier::create(name, transport, location)?;

    let mut uow = storage.begin().await?;
    uow.couriers().add(courier.clone()).await?;
    uow.commit().await?;

    tracing::info!(
        courier_id = %courier.id(),
        name = courier.name(),
        transport = %transport,
        location = %location,
        "Courier registered"
    );

    Ok(courier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStorage;

    #[tokio::test]
    async fn test_register_courier_stores_free_courier() {
        let storage = InMemoryStorage::new();

        let courier = register_courier(&storage, "Ivan", "Bicycle", 3, 4).await.unwrap();
        assert_eq!(courier.transport(), Transport::Bicycle);
        assert!(courier.is_free());

        let mut uow = storage.begin().await.unwrap();
        let free = uow.couriers().get_all_free().await.unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].id(), courier.id());
    }

    #[tokio::test]
    async fn test_register_courier_rejects_bad_input() {
        let storage = InMemoryStorage::new();

        let err = register_courier(&storage, "Ivan", "rocket", 1, 1).await.unwrap_err();
        assert!(matches!(err, RegisterCourierError::Transport(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = register_courier(&storage, "Ivan", "car", 11, 1).await.unwrap_err();
        assert!(matches!(err, RegisterCourierError::Location(_)));

        let err = register_courier(&storage, " ", "car", 1, 1).await.unwrap_err();
        assert!(matches!(err, RegisterCourierError::Courier(CourierError::EmptyName)));

        let mut uow = storage.begin().await.unwrap();
        assert!(uow.couriers().get_all().await.unwrap().is_empty());
    }
}
