use serde::Serialize;

// ============================================================================
// Error Taxonomy
// ============================================================================
//
// Every error enum in the crate maps onto one of these kinds. Loop actors and
// metrics use the kind to decide how loudly a failure is reported; callers of
// the use cases use it to pick a response (e.g. Conflict vs. Validation).
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input at a factory boundary
    Validation,
    /// Business rule violation (double assign, complete unassigned, ...)
    Conflict,
    /// Unknown reference (transport, courier, order)
    NotFound,
    /// Collaborator outside the core failed (geocoding)
    ExternalDependency,
    /// Persistence failure; the current tick is rolled back
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ExternalDependency => "external_dependency",
            ErrorKind::Storage => "storage",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every error enum so failures can be reported uniformly
pub trait Classify {
    fn kind(&self) -> ErrorKind;

    /// Stable dotted code, used as a log field and metrics label
    fn code(&self) -> &'static str;
}
