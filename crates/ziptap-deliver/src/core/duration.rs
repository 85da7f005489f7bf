use std::time::{Duration, Instant};

use tracing::{info, warn};
use ziptap_archive::ArchiveReport;

use crate::data::{Outcome, StrategyKind, StrategyReport};

/// Wall-clock timer around one strategy invocation.
#[derive(Debug)]
pub struct DurationTracker {
    strategy: StrategyKind,
    started: Instant,
}

impl DurationTracker {
    pub fn start(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stops the timer and logs the result.
    pub fn finish(self, outcome: Outcome, archive: Option<&ArchiveReport>) -> StrategyReport {
        let elapsed = self.elapsed();
        let (entries, bytes) = archive.map_or((0, 0), |r| (r.entry_count(), r.total_bytes));

        match &outcome {
            Outcome::Failure(cause) => warn!(
                strategy = %self.strategy,
                elapsed_ms = elapsed.as_millis() as u64,
                entries,
                error = %cause,
                "{} failed after {} seconds",
                self.strategy.label(),
                elapsed.as_secs()
            ),
            Outcome::HandedOff => info!(
                strategy = %self.strategy,
                elapsed_ms = elapsed.as_millis() as u64,
                "{} handed off after {} seconds",
                self.strategy.label(),
                elapsed.as_secs()
            ),
            Outcome::Success => info!(
                strategy = %self.strategy,
                elapsed_ms = elapsed.as_millis() as u64,
                entries,
                bytes,
                "{} took about {} seconds",
                self.strategy.label(),
                elapsed.as_secs()
            ),
        }

        StrategyReport {
            strategy: self.strategy,
            elapsed,
            outcome,
            entries,
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_without_archive_reports_zero() {
        let tracker = DurationTracker::start(StrategyKind::Streaming);
        let report = tracker.finish(Outcome::Failure("boom".into()), None);
        assert_eq!(report.strategy, StrategyKind::Streaming);
        assert_eq!(report.entries, 0);
        assert_eq!(report.bytes, 0);
        assert!(report.outcome.is_failure());
    }

    #[test]
    fn elapsed_is_monotonic() {
        let tracker = DurationTracker::start(StrategyKind::TmpFile);
        std::thread::sleep(Duration::from_millis(5));
        let report = tracker.finish(Outcome::Success, Some(&ArchiveReport::default()));
        assert!(report.elapsed >= Duration::from_millis(5));
        assert!(report.is_success());
    }
}
