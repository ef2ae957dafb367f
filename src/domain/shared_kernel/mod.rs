// Value objects shared by the courier and order aggregates.

pub mod errors;
pub mod location;

pub use errors::*;
pub use location::*;
