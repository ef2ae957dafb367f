use crate::domain::courier::{Courier, CourierError};
use crate::domain::errors::{Classify, ErrorKind};
use crate::domain::order::{Order, OrderError, OrderStatus};

// ============================================================================
// Dispatch Service - Nearest Courier Matching
// ============================================================================
//
// Stateless. Picks the Free courier with the smallest travel time to the
// order's destination; ties go to whichever courier comes first in the input
// (stable scan, no sorting). Busy couriers are excluded before both the
// emptiness check and the scan.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Courier list cannot be empty")]
    NoCouriersProvided,

    #[error("Cannot assign an order whose status is not created (status: {0})")]
    CantAssignOrderWhenStatusIsNotCreated(OrderStatus),

    #[error("No free couriers available")]
    NoCouriersAvailable,

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Courier(#[from] CourierError),
}

impl Classify for DispatchError {
    fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::NoCouriersProvided => ErrorKind::Validation,
            DispatchError::CantAssignOrderWhenStatusIsNotCreated(_) => ErrorKind::Conflict,
            DispatchError::NoCouriersAvailable => ErrorKind::NotFound,
            DispatchError::Order(e) => e.kind(),
            DispatchError::Courier(e) => e.kind(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            DispatchError::NoCouriersProvided => "couriers.is.required",
            DispatchError::CantAssignOrderWhenStatusIsNotCreated(_) => {
                "order.cant.assign.order.when.status.is.not.created"
            }
            DispatchError::NoCouriersAvailable => "no.couriers.available",
            DispatchError::Order(e) => e.code(),
            DispatchError::Courier(e) => e.code(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchService;

impl DispatchService {
    pub fn new() -> Self {
        Self
    }

    /// Assign `order` to the fastest free courier and mark that courier busy.
    ///
    /// On failure the order may already carry the assignment (when the
    /// courier refuses to become busy); callers discard both aggregates.
    pub fn dispatch<'a>(
        &self,
        order: &mut Order,
        couriers: &'a mut [Courier],
    ) -> Result<&'a Courier, DispatchError> {
        if couriers.is_empty() {
            return Err(DispatchError::NoCouriersProvided);
        }
        if order.status() != OrderStatus::Created {
            return Err(DispatchError::CantAssignOrderWhenStatusIsNotCreated(order.status()));
        }

        let destination = order.location();
        let mut winner: Option<(usize, f64)> = None;

        for (index, courier) in couriers.iter().enumerate().filter(|(_, c)| c.is_free()) {
            let time = courier.time_to_location(&destination);
            match winner {
                Some((_, best)) if time >= best => {}
                _ => winner = Some((index, time)),
            }
        }

        let (index, time) = winner.ok_or(DispatchError::NoCouriersAvailable)?;

        order.assign(&couriers[index])?;
        let courier = &mut couriers[index];
        courier.set_busy()?;

        tracing::debug!(
            order_id = %order.id(),
            courier_id = %courier.id(),
            transport = %courier.transport(),
            travel_time = time,
            "Dispatched order to nearest free courier"
        );

        Ok(courier)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::courier::{CourierStatus, Transport};
    use crate::domain::shared_kernel::Location;
    use uuid::Uuid;

    fn loc(x: i32, y: i32) -> Location {
        Location::new(x, y).unwrap()
    }

    fn courier(name: &str, transport: Transport, x: i32, y: i32) -> Courier {
        Courier::create(name, transport, loc(x, y)).unwrap()
    }

    fn order_at(x: i32, y: i32) -> Order {
        Order::create(Uuid::new_v4(), loc(x, y)).unwrap()
    }

    #[test]
    fn test_dispatch_selects_fastest_courier() {
        let mut order = order_at(1, 1);
        let mut couriers = vec![
            courier("Car", Transport::Car, 10, 10),
            courier("Bicycle", Transport::Bicycle, 3, 3),
            courier("Pedestrian", Transport::Pedestrian, 4, 4),
        ];

        let winner = DispatchService::new().dispatch(&mut order, &mut couriers).unwrap();

        assert_eq!(winner.name(), "Bicycle");
        assert_eq!(winner.status(), CourierStatus::Busy);
        assert_eq!(order.status(), OrderStatus::Assigned);
        assert_eq!(order.courier_id(), Some(couriers[1].id()));
        assert!(couriers[0].is_free());
        assert!(couriers[2].is_free());
    }

    #[test]
    fn test_dispatch_tie_goes_to_first_in_input_order() {
        // Pedestrian 2 cells away and car 6 cells away both need 2 ticks
        let mut order = order_at(5, 5);
        let mut couriers = vec![
            courier("Walker", Transport::Pedestrian, 5, 3),
            courier("Driver", Transport::Car, 8, 8),
        ];

        let winner = DispatchService::new().dispatch(&mut order, &mut couriers).unwrap();
        assert_eq!(winner.name(), "Walker");

        let mut order = order_at(5, 5);
        let mut couriers = vec![
            courier("Driver", Transport::Car, 8, 8),
            courier("Walker", Transport::Pedestrian, 5, 3),
        ];
        let winner = DispatchService::new().dispatch(&mut order, &mut couriers).unwrap();
        assert_eq!(winner.name(), "Driver");
    }

    #[test]
    fn test_dispatch_ignores_busy_couriers() {
        let mut order = order_at(1, 1);
        let mut busy = courier("Busy", Transport::Car, 1, 2);
        busy.set_busy().unwrap();
        let mut couriers = vec![busy, courier("Far", Transport::Pedestrian, 9, 9)];

        let winner = DispatchService::new().dispatch(&mut order, &mut couriers).unwrap();
        assert_eq!(winner.name(), "Far");
    }

    #[test]
    fn test_dispatch_fails_when_all_couriers_busy() {
        let mut order = order_at(1, 1);
        let mut busy = courier("Busy", Transport::Car, 1, 2);
        busy.set_busy().unwrap();
        let mut couriers = vec![busy];

        let result = DispatchService::new().dispatch(&mut order, &mut couriers);
        assert!(matches!(result.unwrap_err(), DispatchError::NoCouriersAvailable));
        assert_eq!(order.status(), OrderStatus::Created);
    }

    #[test]
    fn test_dispatch_fails_with_empty_courier_list() {
        let mut order = order_at(1, 1);
        let result = DispatchService::new().dispatch(&mut order, &mut []);
        let err = result.unwrap_err();
        assert!(matches!(err, DispatchError::NoCouriersProvided));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_dispatch_fails_when_order_not_created() {
        let mut order = order_at(1, 1);
        order.assign(&courier("Earlier", Transport::Car, 2, 2)).unwrap();
        let mut couriers = vec![courier("Ivan", Transport::Bicycle, 3, 3)];

        let err = DispatchService::new().dispatch(&mut order, &mut couriers).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::CantAssignOrderWhenStatusIsNotCreated(OrderStatus::Assigned)
        ));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(couriers[0].is_free());
    }
}
