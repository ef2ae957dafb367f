use rand::Rng;
use serde::{Deserialize, Serialize};

use super::errors::{Axis, LocationError};

// ============================================================================
// Location - Grid Coordinate Value Object
// ============================================================================
//
// Immutable once constructed. Both axes are always inside the closed range
// [Location::MIN, Location::MAX]; the only way to build one from outside this
// module is through `Location::new` (or `random`), which enforces the bounds.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    x: i32,
    y: i32,
}

#[derive(Deserialize)]
struct RawLocation {
    x: i32,
    y: i32,
}

impl TryFrom<RawLocation> for Location {
    type Error = LocationError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Location::new(raw.x, raw.y)
    }
}

impl Location {
    pub const MIN: Location = Location { x: 1, y: 1 };
    pub const MAX: Location = Location { x: 10, y: 10 };

    /// Validated factory
    pub fn new(x: i32, y: i32) -> Result<Self, LocationError> {
        if !(Self::MIN.x..=Self::MAX.x).contains(&x) {
            return Err(LocationError::out_of_range(Axis::X, x, Self::MIN.x, Self::MAX.x));
        }
        if !(Self::MIN.y..=Self::MAX.y).contains(&y) {
            return Err(LocationError::out_of_range(Axis::Y, y, Self::MIN.y, Self::MAX.y));
        }
        Ok(Self { x, y })
    }

    /// Uniformly sampled over the whole grid.
    ///
    /// Stand-in for a real address lookup; production call sites obtain a
    /// location from a `GeocodingClient` instead.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            x: rng.gen_range(Self::MIN.x..=Self::MAX.x),
            y: rng.gen_range(Self::MIN.y..=Self::MAX.y),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Manhattan distance
    pub fn distance_to(&self, other: &Location) -> i32 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }

    /// Moves by a delta the caller has already clamped to stay on the grid.
    pub(crate) fn shifted(self, dx: i32, dy: i32) -> Location {
        let moved = Location { x: self.x + dx, y: self.y + dy };
        debug_assert!(
            Location::new(moved.x, moved.y).is_ok(),
            "shift left the grid: {:?} + ({}, {})",
            self,
            dx,
            dy
        );
        moved
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
