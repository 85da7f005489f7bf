//! Immutable data types for the delivery layer.

mod options;
mod report;
mod strategy;

pub use options::{DEFAULT_PIPE_CAPACITY, DeliveryOptions};
pub use report::{Outcome, StrategyReport};
pub use strategy::StrategyKind;
