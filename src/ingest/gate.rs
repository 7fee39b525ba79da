// src/ingest/gate.rs
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

/// Bounds simultaneous outbound fetches and keeps a minimum spacing between
/// them. Admission is first-submitted, first-admitted (the tokio semaphore
/// queues waiters fairly). A failed unit releases its slot like any other.
#[derive(Clone)]
pub struct FetchGate {
    permits: Arc<Semaphore>,
    min_delay: Duration,
}

impl FetchGate {
    pub fn new(limit: usize, min_delay: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.max(1))),
            min_delay,
        }
    }

    /// Run one unit of work under the gate. The slot is held through the
    /// inter-call delay, so spacing applies per slot, not per caller.
    pub async fn admit<T, F>(&self, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("gate semaphore closed");
        let out = work.await;
        if !self.min_delay.is_zero() {
            tokio::time::sleep(self.min_delay).await;
        }
        out
    }
}
