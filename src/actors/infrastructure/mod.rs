// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// - Assignment and movement control loops
// - Health monitoring
// - Coordination and supervision
//
// ============================================================================

// Private module declarations
mod assignment_loop;
mod movement_loop;
mod health_monitor;
mod coordinator;

// Re-export for public API
pub use assignment_loop::{AssignmentLoopActor, RunAssignmentTick};
pub use movement_loop::{MovementLoopActor, RunMovementTick};
pub use health_monitor::{GetSystemHealth, HealthMonitorActor, SystemHealth, UpdateHealth};
pub use coordinator::{CoordinatorActor, GetHealthMonitor, Shutdown};
