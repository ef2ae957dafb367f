use serde::{Deserialize, Serialize};

use super::errors::TransportError;

// ============================================================================
// Courier Value Objects
// ============================================================================

/// Movement profile of a courier. Closed catalog; speed is the number of grid
/// cells a courier covers in one movement tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Pedestrian,
    Bicycle,
    Car,
}

impl Transport {
    pub const ALL: [Transport; 3] = [Transport::Pedestrian, Transport::Bicycle, Transport::Car];

    pub fn id(self) -> i32 {
        match self {
            Transport::Pedestrian => 1,
            Transport::Bicycle => 2,
            Transport::Car => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Transport::Pedestrian => "pedestrian",
            Transport::Bicycle => "bicycle",
            Transport::Car => "car",
        }
    }

    pub fn speed(self) -> i32 {
        match self {
            Transport::Pedestrian => 1,
            Transport::Bicycle => 2,
            Transport::Car => 3,
        }
    }

    pub fn from_id(id: i32) -> Result<Self, TransportError> {
        Self::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or(TransportError::UnknownId(id))
    }

    /// Case-insensitive lookup
    pub fn from_name(name: &str) -> Result<Self, TransportError> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| TransportError::UnknownName(name.to_string()))
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourierStatus {
    Free,
    Busy,
}

impl CourierStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CourierStatus::Free => "free",
            CourierStatus::Busy => "busy",
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
