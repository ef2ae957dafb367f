// ============================================================================
// Order Domain - Business Logic for Order Aggregate
// ============================================================================
//
// - Value objects (OrderStatus)
// - Errors (OrderError enum)
// - Aggregate (Order with its lifecycle transitions)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;

pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
