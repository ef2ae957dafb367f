use crate::domain::errors::{Classify, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("{axis} coordinate {value} is outside the grid range {min}..={max}")]
    OutOfRange {
        axis: Axis,
        value: i32,
        min: i32,
        max: i32,
    },
}

impl LocationError {
    pub(crate) fn out_of_range(axis: Axis, value: i32, min: i32, max: i32) -> Self {
        LocationError::OutOfRange { axis, value, min, max }
    }
}

impl Classify for LocationError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }

    fn code(&self) -> &'static str {
        match self {
            LocationError::OutOfRange { axis: Axis::X, .. } => "location.x.out.of.range",
            LocationError::OutOfRange { axis: Axis::Y, .. } => "location.y.out.of.range",
        }
    }
}
