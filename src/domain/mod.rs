// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with:
// - Value objects
// - Errors
// - Aggregate implementation
//
// shared_kernel holds the grid Location used by both aggregates, services
// holds the dispatch algorithm that works across them.
//
// This layer knows nothing about storage, scheduling or geocoding.
//
// ============================================================================

pub mod errors;
pub mod shared_kernel;
pub mod courier;
pub mod order;
pub mod services;

pub use errors::{Classify, ErrorKind};
