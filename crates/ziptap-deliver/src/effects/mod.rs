//! I/O operations: the three delivery strategies and their plumbing.

mod deliverer;
mod direct;
mod pipe;
mod scheduler;

pub use deliverer::{ByteSource, Deliverer, StrategyResult};
pub use direct::DirectStream;
pub use pipe::PipeReader;
pub use scheduler::{Job, Scheduler, TokioScheduler};
