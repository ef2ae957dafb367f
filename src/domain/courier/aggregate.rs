use serde::Serialize;
use uuid::Uuid;

use crate::domain::shared_kernel::Location;
use super::errors::CourierError;
use super::value_objects::{CourierStatus, Transport};

// ============================================================================
// Courier Aggregate - Business Logic
// ============================================================================
//
// Invariants:
// - name is never empty
// - location is always on the grid (Location guarantees it)
// - status is Busy iff the courier is the subject of exactly one Assigned order
//
// Location is only changed by `go`, status only by `set_busy` / `set_free`.
//
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Courier {
    id: Uuid,
    name: String,
    transport: Transport,
    location: Location,
    status: CourierStatus,
}

impl Courier {
    fn new(name: String, transport: Transport, location: Location) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            transport,
            location,
            status: CourierStatus::Free,
        }
    }

    /// Validated factory; new couriers start Free
    pub fn create(
        name: impl Into<String>,
        transport: Transport,
        location: Location,
    ) -> Result<Self, CourierError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CourierError::EmptyName);
        }
        Ok(Self::new(name, transport, location))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn status(&self) -> CourierStatus {
        self.status
    }

    pub fn is_free(&self) -> bool {
        self.status == CourierStatus::Free
    }

    pub fn set_busy(&mut self) -> Result<(), CourierError> {
        if self.status == CourierStatus::Busy {
            return Err(CourierError::AlreadyBusy);
        }
        self.status = CourierStatus::Busy;
        Ok(())
    }

    /// Idempotent
    pub fn set_free(&mut self) {
        self.status = CourierStatus::Free;
    }

    /// Travel time in movement ticks, as a real number
    pub fn time_to_location(&self, destination: &Location) -> f64 {
        f64::from(self.location.distance_to(destination)) / f64::from(self.transport.speed())
    }

    /// Advance one movement tick toward `destination`.
    ///
    /// X is travelled first. Whatever part of the speed budget is left once X
    /// is reached carries over to Y within the same tick. The courier never
    /// overshoots and never leaves the grid.
    pub fn go(&mut self, destination: &Location) {
        let dx = destination.x() - self.location.x();
        let dy = destination.y() - self.location.y();
        let mut budget = self.transport.speed();

        if budget <= dx.abs() {
            self.location = self.location.shifted(budget * dx.signum(), 0);
            return;
        }

        self.location = self.location.shifted(dx, 0);
        if self.location == *destination {
            return;
        }
        budget -= dx.abs();

        if budget <= dy.abs() {
            self.location = self.location.shifted(0, budget * dy.signum());
        } else {
            self.location = self.location.shifted(0, dy);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
