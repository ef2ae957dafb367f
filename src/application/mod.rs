// ============================================================================
// Application Layer - Use Cases
// ============================================================================
//
// Each use case opens its own unit of work from the `Storage` port and
// returns a typed error implementing `Classify`.
//
// - assign_order / move_couriers: one tick of each control loop
// - place_order / register_courier: inbound writes
// - queries: read-only snapshots
//
// ============================================================================

pub mod assign_order;
pub mod move_couriers;
pub mod place_order;
pub mod register_courier;
pub mod queries;

pub use assign_order::{AssignOrderError, AssignOrderHandler, AssignOutcome};
pub use move_couriers::{MoveCouriersError, MoveCouriersHandler, MoveOutcome};
pub use place_order::{PlaceOrder, PlaceOrderError, PlaceOrderHandler, PlaceOrderOutcome};
pub use register_courier::{register_courier, RegisterCourierError};
pub use queries::{CourierView, DeliveryQueries, LocationView, OrderView};
