//! One-shot cycle scheduling with an in-flight guard
//!
//! A trigger submits one job to the tokio runtime. While that job is
//! outstanding further submissions are ignored.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow};
use tokio::task::JoinHandle;
use tracing::warn;

/// Clears the in-flight flag when the job ends, including by panic
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to a submitted job
#[derive(Debug)]
pub struct CycleHandle<T> {
    inner: JoinHandle<T>,
}

impl<T> CycleHandle<T> {
    /// Wait for the job's output
    pub async fn join(self) -> Result<T> {
        self.inner
            .await
            .map_err(|e| anyhow!("Fetch cycle task failed: {e}"))
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

/// Fire-once scheduler allowing a single outstanding job
#[derive(Debug, Clone, Default)]
pub struct CycleScheduler {
    in_flight: Arc<AtomicBool>,
}

impl CycleScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a submitted job has not finished
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Spawn `job` unless one is already running; returns `None` when ignored.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<F, Fut, T>(&self, job: F) -> Option<CycleHandle<T>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("A fetch cycle is already running, ignoring trigger");
            return None;
        }

        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let inner = tokio::spawn(async move {
            let _guard = guard;
            job().await
        });

        Some(CycleHandle { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_second_trigger_is_ignored_while_running() {
        let scheduler = CycleScheduler::new();
        let (release, wait) = oneshot::channel::<()>();

        let first = scheduler
            .submit(move || async move {
                let _ = wait.await;
                1
            })
            .unwrap();
        assert!(scheduler.is_busy());
        assert!(scheduler.submit(|| async { 2 }).is_none());

        release.send(()).unwrap();
        assert_eq!(first.join().await.unwrap(), 1);
        assert!(!scheduler.is_busy());

        let second = scheduler.submit(|| async { 3 }).unwrap();
        assert_eq!(second.join().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_guard_released_after_panic() {
        let scheduler = CycleScheduler::new();
        let handle = scheduler
            .submit(|| async {
                panic!("boom");
            })
            .unwrap();

        let result: Result<()> = handle.join().await;
        assert!(result.is_err());
        assert!(!scheduler.is_busy());
        assert!(scheduler.submit(|| async {}).is_some());
    }
}
