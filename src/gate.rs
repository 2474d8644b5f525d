use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

/// Counting admission gate. At most `limit` futures passed to [`run`] execute
/// at once; the rest wait for a permit in arrival order.
///
/// [`run`]: ConcurrencyGate::run
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permits: Arc<Semaphore>,
    limit: usize,
}

impl ConcurrencyGate {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Waits for a permit, then drives `fut` to completion. The permit is
    /// released when this future finishes or is dropped, including on panic.
    pub async fn run<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        // the semaphore is never closed
        let _permit = self.permits.acquire().await.ok();
        fut.await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn never_exceeds_limit() {
        let gate = ConcurrencyGate::new(3);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let gate = gate.clone();
                let active = active.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    gate.run(async {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await;
                })
            })
            .collect();

        for handle in futures::future::join_all(handles).await {
            handle.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn permit_released_after_panic() {
        let gate = ConcurrencyGate::new(1);
        let panicking = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.run(async {
                    if gate.limit() == 1 {
                        panic!("boom");
                    }
                })
                .await;
            })
        };
        assert!(panicking.await.is_err());

        let value = tokio::time::timeout(Duration::from_secs(1), gate.run(async { 7 }))
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn zero_limit_is_clamped() {
        assert_eq!(ConcurrencyGate::new(0).limit(), 1);
    }
}
