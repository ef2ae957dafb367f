// ============================================================================
// Courier Domain - Business Logic for Courier Aggregate
// ============================================================================
//
// - Value objects (Transport catalog, CourierStatus)
// - Errors (CourierError, TransportError)
// - Aggregate (Courier with the movement step)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;

pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
