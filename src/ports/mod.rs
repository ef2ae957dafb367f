// ============================================================================
// Ports - Contracts the core expects adapters to fulfil
// ============================================================================
//
// - store:     repositories + unit of work (one per tick / per request)
// - geocoding: street name -> grid location
//
// The scheduling trigger is not a trait: the loop actors own their timers and
// call the use case handlers directly.
//
// ============================================================================

pub mod store;
pub mod geocoding;

pub use store::*;
pub use geocoding::*;
