use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use tokio::io::{AsyncRead, DuplexStream, ReadBuf};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::data::{Outcome, StrategyKind, StrategyReport};

/// Read end of the piped strategy.
///
/// Yields archive bytes as the background job produces them. At end of
/// stream it waits for the job's final report; a failed or missing report
/// turns the end of stream into an I/O error. Dropping the reader cancels
/// the job.
#[derive(Debug)]
pub struct PipeReader {
    inner: DuplexStream,
    report: Option<oneshot::Receiver<StrategyReport>>,
    final_report: Option<StrategyReport>,
    cancel: CancellationToken,
}

impl PipeReader {
    pub(crate) fn new(
        inner: DuplexStream,
        report: oneshot::Receiver<StrategyReport>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            inner,
            report: Some(report),
            final_report: None,
            cancel,
        }
    }

    /// The producer's report, once end of stream was reached.
    pub fn final_report(&self) -> Option<&StrategyReport> {
        self.final_report.as_ref()
    }

    fn poll_report(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if let Some(rx) = self.report.as_mut() {
            let received = ready!(Pin::new(rx).poll(cx));
            self.report = None;
            self.final_report = Some(received.unwrap_or_else(|_| StrategyReport {
                strategy: StrategyKind::Piped,
                elapsed: Duration::ZERO,
                outcome: Outcome::Failure("archive producer exited without a report".into()),
                entries: 0,
                bytes: 0,
            }));
        }

        match self.final_report.as_ref().map(|r| &r.outcome) {
            Some(Outcome::Failure(cause)) => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("archive production failed: {cause}"),
            ))),
            _ => Poll::Ready(Ok(())),
        }
    }
}

impl AsyncRead for PipeReader {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;

        if buf.filled().len() > before || buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }
        this.poll_report(cx)
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
