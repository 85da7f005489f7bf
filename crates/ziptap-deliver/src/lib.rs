//! Delivery strategies for dynamically generated ZIP archives.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Strategy kinds, reports and configuration
//! - [`core`] - Timing of strategy invocations
//! - [`effects`] - Temp file, bounded pipe and direct sink delivery
//!
//! # Key Features
//!
//! - **Temp File**: Archive is finished on disk before the first byte is sent
//! - **Bounded Pipe**: Background producer, memory capped by the pipe capacity
//! - **Direct**: Production driven by the response body, one step per poll
//! - **Mechanism-Only**: Routing, headers and response plumbing stay with the caller

mod core;
mod data;
mod effects;
mod error;

pub use self::core::DurationTracker;
pub use data::{DEFAULT_PIPE_CAPACITY, DeliveryOptions, Outcome, StrategyKind, StrategyReport};
pub use effects::{ByteSource, Deliverer, DirectStream, Job, PipeReader, Scheduler, StrategyResult, TokioScheduler};
pub use error::{DeliveryError, Result};
