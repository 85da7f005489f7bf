use std::time::Duration;

use crate::data::StrategyKind;

/// How a strategy invocation ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Production continues on a background job; the final report follows
    /// through the pipe.
    HandedOff,
    Failure(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Timing and size summary of one strategy invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategyReport {
    pub strategy: StrategyKind,
    pub elapsed: Duration,
    pub outcome: Outcome,
    pub entries: usize,
    /// Uncompressed bytes archived.
    pub bytes: u64,
}

impl StrategyReport {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
