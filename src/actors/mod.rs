// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based scheduling and supervision.
//
// Structure:
// - core/           - Abstract traits and types (HealthStatus, SupervisedActor)
// - infrastructure/ - Concrete actors (control loops, health, coordinator)
//
// Note: Dispatch and movement rules live in the domain and application
//       layers. Actors only decide WHEN a use case runs and report results.
//
// ============================================================================

// Private module declarations
mod core;
mod infrastructure;

// Re-export only what's needed in the public API
pub use self::core::{ComponentHealth, HealthStatus};
pub use infrastructure::{
    AssignmentLoopActor, CoordinatorActor, GetHealthMonitor, GetSystemHealth, HealthMonitorActor,
    MovementLoopActor, RunAssignmentTick, RunMovementTick, Shutdown, SystemHealth, UpdateHealth,
};
