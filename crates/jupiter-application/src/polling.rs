//! Cancellable repeating refresh tasks.
//!
//! Each active view keeps its data fresh through one or more polling leases.
//! A lease runs its fetch once immediately, then on a fixed period, until
//! cancelled. Ticks are fire-and-forget: a slow fetch never delays the next
//! tick, and a failed fetch is logged and swallowed so the loop self-heals
//! on its next tick.
//!
//! Cancellation is cooperative and effective before the next scheduled tick.
//! An in-flight fetch is raced against the cancellation token, so its result
//! is dropped rather than applied once the lease is cancelled. Each lease
//! additionally carries a generation number so callers holding state outside
//! the fetch future can discard results from a superseded lease.

use jupiter_core::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Badge counts tolerate more lag than an open conversation.
pub const UNREAD_POLL_PERIOD: Duration = Duration::from_secs(10);
/// Refresh period for an open direct-message thread.
pub const DM_POLL_PERIOD: Duration = Duration::from_secs(3);

struct LeaseSlot {
    generation: u64,
    token: CancellationToken,
}

/// Registry of active polling leases, keyed by subsystem.
///
/// Starting a key that is already active supersedes (cancels) the previous
/// lease for that key. `cancel_all` is the logout path: no lease survives it.
#[derive(Clone, Default)]
pub struct PollingPool {
    slots: Arc<Mutex<HashMap<String, LeaseSlot>>>,
    next_generation: Arc<AtomicU64>,
}

/// Live handle to one recurring refresh, owned by the view that started it.
#[derive(Clone)]
pub struct PollingLease {
    key: String,
    generation: u64,
    token: CancellationToken,
    slots: Arc<Mutex<HashMap<String, LeaseSlot>>>,
}

impl PollingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a recurring refresh: `fetch` runs once now, then every
    /// `period`, until the returned lease is cancelled.
    pub fn start<F, Fut>(&self, key: impl Into<String>, period: Duration, fetch: F) -> PollingLease
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let key = key.into();
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();

        {
            let mut slots = lock(&self.slots);
            if let Some(old) = slots.insert(
                key.clone(),
                LeaseSlot {
                    generation,
                    token: token.clone(),
                },
            ) {
                tracing::debug!(key = %key, "superseding existing polling lease");
                old.token.cancel();
            }
        }

        let loop_token = token.clone();
        let loop_key = key.clone();
        let fetch = Arc::new(fetch);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {
                        if loop_token.is_cancelled() {
                            break;
                        }
                        let fetch = Arc::clone(&fetch);
                        let guard = loop_token.clone();
                        let tick_key = loop_key.clone();
                        tokio::spawn(async move {
                            tokio::select! {
                                _ = guard.cancelled() => {
                                    tracing::debug!(key = %tick_key, "dropping in-flight fetch of cancelled lease");
                                }
                                result = fetch() => {
                                    if let Err(err) = result {
                                        tracing::warn!(
                                            key = %tick_key,
                                            error = %err,
                                            "poll tick failed; retrying on next tick"
                                        );
                                    }
                                }
                            }
                        });
                    }
                }
            }
            tracing::debug!(key = %loop_key, "polling loop stopped");
        });

        PollingLease {
            key,
            generation,
            token,
            slots: Arc::clone(&self.slots),
        }
    }

    /// True while the lease is the live one for its key. Used to discard
    /// late results held outside the fetch future.
    pub fn is_current(&self, lease: &PollingLease) -> bool {
        !lease.token.is_cancelled()
            && lock(&self.slots)
                .get(&lease.key)
                .is_some_and(|slot| slot.generation == lease.generation)
    }

    /// Cancels the lease registered under `key`, if any.
    pub fn cancel(&self, key: &str) {
        if let Some(slot) = lock(&self.slots).remove(key) {
            slot.token.cancel();
        }
    }

    /// Cancels every active lease. Runs on logout and on session teardown.
    pub fn cancel_all(&self) {
        let mut slots = lock(&self.slots);
        for (key, slot) in slots.drain() {
            tracing::debug!(key = %key, "cancelling polling lease");
            slot.token.cancel();
        }
    }

    /// Keys with a live lease. Mostly useful for assertions in tests.
    pub fn active_keys(&self) -> Vec<String> {
        lock(&self.slots).keys().cloned().collect()
    }
}

impl PollingLease {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Monotonically increasing token identifying this lease's epoch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stops the loop. Idempotent; no tick runs after this returns, and an
    /// in-flight fetch is dropped rather than applied.
    pub fn cancel(&self) {
        self.token.cancel();
        let mut slots = lock(&self.slots);
        if slots
            .get(&self.key)
            .is_some_and(|slot| slot.generation == self.generation)
        {
            slots.remove(&self.key);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_fetch(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn() -> std::future::Ready<Result<()>> + Send + Sync {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn lease_fires_immediately_then_on_period() {
        let pool = PollingPool::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let _lease = pool.start(
            "unread",
            Duration::from_secs(10),
            counting_fetch(Arc::clone(&ticks)),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_lease_never_ticks_again() {
        let pool = PollingPool::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let lease = pool.start(
            "unread",
            Duration::from_secs(10),
            counting_fetch(Arc::clone(&ticks)),
        );

        // t = 0 and t = 10s fire, cancel at t ≈ 10.05s
        tokio::time::sleep(Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        lease.cancel();
        assert!(lease.is_cancelled());

        // the t = 20s tick must not happen
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert!(pool.active_keys().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_fetch_result_is_dropped_after_cancel() {
        let pool = PollingPool::new();
        let applied = Arc::new(AtomicUsize::new(0));
        let applied_in_fetch = Arc::clone(&applied);
        let lease = pool.start("slow", Duration::from_secs(10), move || {
            let applied = Arc::clone(&applied_in_fetch);
            async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                applied.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        // first tick starts its 5s fetch; cancel at 1s, well before it lands
        tokio::time::sleep(Duration::from_secs(1)).await;
        lease.cancel();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(applied.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failures_do_not_stop_the_loop() {
        let pool = PollingPool::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_in_fetch = Arc::clone(&attempts);
        let _lease = pool.start("flaky", Duration::from_secs(10), move || {
            let attempts = Arc::clone(&attempts_in_fetch);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(jupiter_core::JupiterError::network("connection refused"))
            }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(attempts.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn leases_with_distinct_keys_run_independently() {
        let pool = PollingPool::new();
        let fast = Arc::new(AtomicUsize::new(0));
        let slow = Arc::new(AtomicUsize::new(0));
        let fast_lease = pool.start(
            "dm:7",
            Duration::from_secs(3),
            counting_fetch(Arc::clone(&fast)),
        );
        let _slow_lease = pool.start(
            "unread",
            Duration::from_secs(10),
            counting_fetch(Arc::clone(&slow)),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_secs(9)).await;
        // fast: t = 0, 3, 6, 9; slow: t = 0
        assert_eq!(fast.load(Ordering::SeqCst), 4);
        assert_eq!(slow.load(Ordering::SeqCst), 1);

        // cancelling one key leaves the other running
        fast_lease.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fast.load(Ordering::SeqCst), 4);
        assert!(slow.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_a_key_supersedes_the_old_lease() {
        let pool = PollingPool::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let old = pool.start(
            "unread",
            Duration::from_secs(10),
            counting_fetch(Arc::clone(&first)),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;

        let new = pool.start(
            "unread",
            Duration::from_secs(10),
            counting_fetch(Arc::clone(&second)),
        );
        assert!(!pool.is_current(&old));
        assert!(pool.is_current(&new));
        assert!(new.generation() > old.generation());

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert!(second.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_stops_every_lease() {
        let pool = PollingPool::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let a = pool.start(
            "a",
            Duration::from_secs(3),
            counting_fetch(Arc::clone(&ticks)),
        );
        let b = pool.start(
            "b",
            Duration::from_secs(10),
            counting_fetch(Arc::clone(&ticks)),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        pool.cancel_all();
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
        assert!(pool.active_keys().is_empty());

        let after_cancel = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    }
}
