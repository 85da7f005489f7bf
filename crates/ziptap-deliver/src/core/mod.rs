//! Pure bookkeeping around strategy invocations.

mod duration;

pub use duration::DurationTracker;
