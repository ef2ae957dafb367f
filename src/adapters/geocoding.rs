use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::shared_kernel::Location;
use crate::ports::{GeocodingClient, GeocodingError};
use crate::utils::{
    retry_on_transient, CircuitBreaker, CircuitBreakerError, IsTransient, RetryConfig,
};

// ============================================================================
// Geocoding Adapters
// ============================================================================
//
// - StreetTableGeocoder: fixed street -> cell table, loaded from config
// - RandomGeocoder:      any street -> random cell
// - ResilientGeocoder:   retry + circuit breaker around any of the above
//
// ============================================================================

/// Case-insensitive street table
#[derive(Debug, Clone)]
pub struct StreetTableGeocoder {
    streets: HashMap<String, Location>,
    fallback_random: bool,
}

impl StreetTableGeocoder {
    /// Build from raw `[x, y]` pairs; every entry must be on the grid
    pub fn from_table(
        table: &HashMap<String, [i32; 2]>,
        fallback_random: bool,
    ) -> Result<Self, GeocodingError> {
        let mut streets = HashMap::with_capacity(table.len());
        for (street, [x, y]) in table {
            let location = Location::new(*x, *y).map_err(|source| GeocodingError::OffGrid {
                street: street.clone(),
                source,
            })?;
            streets.insert(normalize(street), location);
        }

        Ok(Self {
            streets,
            fallback_random,
        })
    }

    pub fn len(&self) -> usize {
        self.streets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streets.is_empty()
    }
}

fn normalize(street: &str) -> String {
    street.trim().to_lowercase()
}

#[async_trait]
impl GeocodingClient for StreetTableGeocoder {
    async fn resolve(&self, street: &str) -> Result<Location, GeocodingError> {
        let key = normalize(street);
        if key.is_empty() {
            return Err(GeocodingError::EmptyStreet);
        }

        match self.streets.get(&key) {
            Some(location) => Ok(*location),
            None if self.fallback_random => {
                let location = Location::random();
                tracing::debug!(street, %location, "Unknown street, using random location");
                Ok(location)
            }
            None => Err(GeocodingError::UnknownStreet(street.trim().to_string())),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomGeocoder;

#[async_trait]
impl GeocodingClient for RandomGeocoder {
    async fn resolve(&self, street: &str) -> Result<Location, GeocodingError> {
        if street.trim().is_empty() {
            return Err(GeocodingError::EmptyStreet);
        }
        Ok(Location::random())
    }
}

/// Retries transient failures, and stops calling the inner geocoder while
/// it keeps failing. Permanent errors never trip the breaker.
#[derive(Clone)]
pub struct ResilientGeocoder<G> {
    inner: G,
    retry: RetryConfig,
    breaker: CircuitBreaker,
}

impl<G: GeocodingClient> ResilientGeocoder<G> {
    pub fn new(inner: G, retry: RetryConfig, breaker: CircuitBreaker) -> Self {
        Self {
            inner,
            retry,
            breaker,
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

#[async_trait]
impl<G: GeocodingClient> GeocodingClient for ResilientGeocoder<G> {
    async fn resolve(&self, street: &str) -> Result<Location, GeocodingError> {
        let attempt = async {
            retry_on_transient("geocode", &self.retry, |_attempt| self.inner.resolve(street))
                .await
                .into_result()
        };

        match self
            .breaker
            .call_counting(attempt, |e: &GeocodingError| e.is_transient())
            .await
        {
            Ok(location) => Ok(location),
            Err(CircuitBreakerError::CircuitOpen) => Err(GeocodingError::CircuitOpen),
            Err(CircuitBreakerError::OperationFailed(e)) => Err(e),
        }
    }
}
