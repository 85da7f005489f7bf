use tokio::runtime::Handle;

/// Blocking work handed to a scheduler.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs background production jobs.
///
/// Jobs block on pipe writes, so implementations must not run them on an
/// async worker thread.
pub trait Scheduler: Send + Sync {
    fn spawn(&self, job: Job);
}

/// Runs jobs on a Tokio runtime's blocking pool.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn spawn(&self, job: Job) {
        // Detached: the job reports through its own channel.
        drop(self.handle.spawn_blocking(job));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn tokio_scheduler_runs_job() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let (tx, rx) = tokio::sync::oneshot::channel();

        TokioScheduler::new(Handle::current()).spawn(Box::new(move || {
            flag.store(true, Ordering::SeqCst);
            let _ = tx.send(());
        }));

        rx.await.unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }
}
