use async_trait::async_trait;

use crate::domain::errors::{Classify, ErrorKind};
use crate::domain::shared_kernel::{Location, LocationError};
use crate::utils::IsTransient;

// ============================================================================
// Geocoding Port
// ============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum GeocodingError {
    #[error("Street name cannot be empty")]
    EmptyStreet,

    #[error("Unknown street: {0}")]
    UnknownStreet(String),

    #[error("Street {street} resolved outside the grid: {source}")]
    OffGrid {
        street: String,
        #[source]
        source: LocationError,
    },

    #[error("Geocoding service unavailable: {0}")]
    Unavailable(String),

    #[error("Geocoding circuit breaker is open")]
    CircuitOpen,
}

impl IsTransient for GeocodingError {
    fn is_transient(&self) -> bool {
        matches!(self, GeocodingError::Unavailable(_))
    }
}

impl Classify for GeocodingError {
    fn kind(&self) -> ErrorKind {
        match self {
            GeocodingError::EmptyStreet => ErrorKind::Validation,
            _ => ErrorKind::ExternalDependency,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            GeocodingError::EmptyStreet => "geocoding.street.is.required",
            GeocodingError::UnknownStreet(_) => "geocoding.unknown.street",
            GeocodingError::OffGrid { .. } => "geocoding.off.grid",
            GeocodingError::Unavailable(_) => "geocoding.unavailable",
            GeocodingError::CircuitOpen => "geocoding.circuit.open",
        }
    }
}

/// Resolves a street name to a grid location
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    async fn resolve(&self, street: &str) -> Result<Location, GeocodingError>;
}
