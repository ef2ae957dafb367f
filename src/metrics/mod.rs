// Private module declaration
mod server;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};

use crate::utils::CircuitState;

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers:
// - Loop ticks by outcome and tick latency
// - Order lifecycle counters (placed, assigned, completed)
// - Courier movement steps
// - Geocoding failures and the geocoder circuit breaker
// - Overall health as seen by the health monitor
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub const ASSIGNMENT_LOOP: &str = "assignment";
pub const MOVEMENT_LOOP: &str = "movement";

/// Central metrics registry for the dispatch service
pub struct Metrics {
    registry: Registry,

    // Loop Metrics
    pub ticks_total: IntCounterVec,
    pub tick_duration: HistogramVec,

    // Order / Courier Metrics
    pub orders_placed: IntCounter,
    pub orders_assigned: IntCounter,
    pub orders_completed: IntCounter,
    pub courier_moves: IntCounter,

    // Geocoding Metrics
    pub geocoding_failures: IntCounterVec,
    pub circuit_breaker_state: IntGauge,

    // Health
    pub health_status: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Loop Metrics
        let ticks_total = IntCounterVec::new(
            Opts::new("dispatch_ticks_total", "Control loop ticks by outcome"),
            &["loop", "outcome"],
        )?;
        registry.register(Box::new(ticks_total.clone()))?;

        let tick_duration = HistogramVec::new(
            HistogramOpts::new("dispatch_tick_duration_seconds", "Control loop tick duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["loop"],
        )?;
        registry.register(Box::new(tick_duration.clone()))?;

        // Order / Courier Metrics
        let orders_placed = IntCounter::new("dispatch_orders_placed_total", "Orders accepted")?;
        registry.register(Box::new(orders_placed.clone()))?;

        let orders_assigned =
            IntCounter::new("dispatch_orders_assigned_total", "Orders matched to a courier")?;
        registry.register(Box::new(orders_assigned.clone()))?;

        let orders_completed =
            IntCounter::new("dispatch_orders_completed_total", "Orders delivered")?;
        registry.register(Box::new(orders_completed.clone()))?;

        let courier_moves =
            IntCounter::new("dispatch_courier_moves_total", "Courier movement steps taken")?;
        registry.register(Box::new(courier_moves.clone()))?;

        // Geocoding Metrics
        let geocoding_failures = IntCounterVec::new(
            Opts::new("dispatch_geocoding_failures_total", "Street lookups that failed"),
            &["reason"],
        )?;
        registry.register(Box::new(geocoding_failures.clone()))?;

        let circuit_breaker_state = IntGauge::new(
            "dispatch_geocoder_circuit_breaker_state",
            "Geocoder circuit breaker state (0=Closed, 1=HalfOpen, 2=Open)",
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        let health_status = IntGauge::new(
            "dispatch_health_status",
            "Overall health (0=Unhealthy, 1=Degraded, 2=Healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        Ok(Self {
            registry,
            ticks_total,
            tick_duration,
            orders_placed,
            orders_assigned,
            orders_completed,
            courier_moves,
            geocoding_failures,
            circuit_breaker_state,
            health_status,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one loop tick
    pub fn record_tick(&self, loop_name: &str, outcome: &str, duration_secs: f64) {
        self.ticks_total.with_label_values(&[loop_name, outcome]).inc();
        self.tick_duration.with_label_values(&[loop_name]).observe(duration_secs);
    }

    /// Helper to record the result of a movement tick
    pub fn record_movement(&self, moved: usize, completed: usize) {
        self.courier_moves.inc_by(moved as u64);
        self.orders_completed.inc_by(completed as u64);
    }

    /// Helper to record a failed street lookup
    pub fn record_geocoding_failure(&self, reason: &str) {
        self.geocoding_failures.with_label_values(&[reason]).inc();
    }

    /// Helper to update circuit breaker state
    pub fn update_circuit_breaker_state(&self, state: CircuitState) {
        self.circuit_breaker_state.set(state.as_gauge());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.orders_placed.inc();
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new().unwrap();
        metrics.record_tick(ASSIGNMENT_LOOP, "assigned", 0.002);
        metrics.record_tick(ASSIGNMENT_LOOP, "assigned", 0.004);
        metrics.record_tick(MOVEMENT_LOOP, "idle", 0.001);

        assert_eq!(
            metrics.ticks_total.with_label_values(&[ASSIGNMENT_LOOP, "assigned"]).get(),
            2
        );
        assert_eq!(
            metrics.tick_duration.with_label_values(&[ASSIGNMENT_LOOP]).get_sample_count(),
            2
        );
    }

    #[test]
    fn test_record_movement() {
        let metrics = Metrics::new().unwrap();
        metrics.record_movement(3, 1);
        metrics.record_movement(2, 0);

        assert_eq!(metrics.courier_moves.get(), 5);
        assert_eq!(metrics.orders_completed.get(), 1);
    }

    #[test]
    fn test_geocoding_metrics() {
        let metrics = Metrics::new().unwrap();
        metrics.record_geocoding_failure("geocoding.unknown.street");
        metrics.update_circuit_breaker_state(CircuitState::Open);

        assert_eq!(
            metrics
                .geocoding_failures
                .with_label_values(&["geocoding.unknown.street"])
                .get(),
            1
        );
        assert_eq!(metrics.circuit_breaker_state.get(), 2);
    }
}
