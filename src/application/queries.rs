use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::courier::{Courier, CourierStatus, Transport};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::shared_kernel::Location;
use crate::ports::{Storage, StoreError};

// ============================================================================
// Read Models
// ============================================================================
//
// Snapshots read through a single unit of work that is dropped without
// committing, so queries never write.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocationView {
    pub x: i32,
    pub y: i32,
}

impl From<Location> for LocationView {
    fn from(location: Location) -> Self {
        Self {
            x: location.x(),
            y: location.y(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourierView {
    pub id: Uuid,
    pub name: String,
    pub transport: Transport,
    pub location: LocationView,
    pub status: CourierStatus,
}

impl From<&Courier> for CourierView {
    fn from(courier: &Courier) -> Self {
        Self {
            id: courier.id(),
            name: courier.name().to_string(),
            transport: courier.transport(),
            location: courier.location().into(),
            status: courier.status(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub id: Uuid,
    pub location: LocationView,
    pub status: OrderStatus,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            location: order.location().into(),
            status: order.status(),
        }
    }
}

#[derive(Clone)]
pub struct DeliveryQueries {
    storage: Arc<dyn Storage>,
}

impl DeliveryQueries {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn list_couriers(&self) -> Result<Vec<CourierView>, StoreError> {
        let mut uow = self.storage.begin().await?;
        let couriers = uow.couriers().get_all().await?;
        Ok(couriers.iter().map(CourierView::from).collect())
    }

    /// Created and Assigned orders
    pub async fn list_active_orders(&self) -> Result<Vec<OrderView>, StoreError> {
        let mut uow = self.storage.begin().await?;
        let orders = uow.orders().get_all_not_completed().await?;
        Ok(orders.iter().map(OrderView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStorage;

    #[tokio::test]
    async fn test_list_views_reflect_storage() {
        let storage = InMemoryStorage::new();
        let mut courier =
            Courier::create("Ivan", Transport::Car, Location::new(2, 3).unwrap()).unwrap();
        let mut assigned = Order::create(Uuid::new_v4(), Location::new(5, 5).unwrap()).unwrap();
        let mut completed = Order::create(Uuid::new_v4(), Location::new(6, 6).unwrap()).unwrap();
        let waiting = Order::create(Uuid::new_v4(), Location::new(7, 7).unwrap()).unwrap();
        assigned.assign(&courier).unwrap();
        courier.set_busy().unwrap();
        completed.assign(&courier).unwrap();
        completed.complete().unwrap();

        let mut uow = storage.begin().await.unwrap();
        uow.couriers().add(courier.clone()).await.unwrap();
        uow.orders().add(assigned.clone()).await.unwrap();
        uow.orders().add(completed).await.unwrap();
        uow.orders().add(waiting.clone()).await.unwrap();
        uow.commit().await.unwrap();
        drop(uow);

        let queries = DeliveryQueries::new(Arc::new(storage));

        let couriers = queries.list_couriers().await.unwrap();
        assert_eq!(couriers.len(), 1);
        assert_eq!(couriers[0].name, "Ivan");
        assert_eq!(couriers[0].location, LocationView { x: 2, y: 3 });
        assert_eq!(couriers[0].status, CourierStatus::Busy);

        let orders = queries.list_active_orders().await.unwrap();
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![assigned.id(), waiting.id()]);
    }

    #[test]
    fn test_views_serialize_lowercase_enums() {
        let courier =
            Courier::create("Ivan", Transport::Bicycle, Location::new(1, 2).unwrap()).unwrap();
        let json = serde_json::to_value(CourierView::from(&courier)).unwrap();

        assert_eq!(json["transport"], "bicycle");
        assert_eq!(json["status"], "free");
        assert_eq!(json["location"]["x"], 1);
        assert_eq!(json["location"]["y"], 2);
    }
}
