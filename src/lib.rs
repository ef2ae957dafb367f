// ============================================================================
// Courier Dispatch
// ============================================================================
//
// Layers, inside out:
// - domain/      - Location, Courier, Order, DispatchService
// - ports/       - storage and geocoding contracts
// - application/ - use cases (assign, move, place, register, queries)
// - adapters/    - in-memory storage, geocoders
// - actors/      - periodic control loops, health, supervision
// - metrics/     - Prometheus registry and the /metrics, /health endpoint
//
// ============================================================================

pub mod actors;
pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod utils;
