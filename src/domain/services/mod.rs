// Domain services: logic spanning more than one aggregate.

pub mod dispatch;

pub use dispatch::{DispatchError, DispatchService};
