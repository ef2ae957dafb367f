// ============================================================================
// Adapters - Port implementations
// ============================================================================

pub mod in_memory;
pub mod geocoding;

pub use in_memory::InMemoryStorage;
pub use geocoding::{RandomGeocoder, ResilientGeocoder, StreetTableGeocoder};
