//! Debounced execution for live search.
//!
//! Every keystroke in the search box sends a request. Rapid successive calls
//! collapse: each call resets the quiet period, and only the last call to
//! survive a full quiet period actually runs. Superseded calls resolve to
//! `None` and are not queued.
//!
//! ```text
//! call("p")    ──┐ superseded
//! call("ph")   ──┼─┐ superseded
//! call("pho")  ──┴─┴──── quiet period ────▶ runs search("pho")
//! ```
//!
//! [`SearchDebouncers`] keeps one [`Debouncer`] per browser session so that
//! two shoppers typing at once never cancel each other.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

/// Idle time after which a session's debouncer is evicted.
const DEBOUNCER_IDLE: Duration = Duration::from_secs(10 * 60);

/// Upper bound on concurrently tracked sessions.
const MAX_DEBOUNCERS: u64 = 10_000;

/// Last-write-wins gate with a fixed quiet period.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    latest: AtomicU64,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            latest: AtomicU64::new(0),
        }
    }

    /// Run `f(args)` unless another call arrives within the quiet period.
    ///
    /// Returns `None` when this call was superseded.
    pub async fn call<A, F, Fut>(&self, args: A, f: F) -> Option<Fut::Output>
    where
        F: FnOnce(A) -> Fut,
        Fut: Future,
    {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.quiet).await;

        if self.latest.load(Ordering::SeqCst) != ticket {
            return None;
        }

        Some(f(args).await)
    }
}

/// A function wrapped in a [`Debouncer`].
pub struct Debounced<F> {
    f: F,
    debouncer: Debouncer,
}

impl<F> Debounced<F> {
    /// Wrap `f` so that calls within `quiet` of each other collapse.
    #[must_use]
    pub const fn new(f: F, quiet: Duration) -> Self {
        Self {
            f,
            debouncer: Debouncer::new(quiet),
        }
    }

    /// Invoke the wrapped function, debounced.
    ///
    /// Returns `None` when this call was superseded.
    pub async fn call<A, Fut>(&self, args: A) -> Option<Fut::Output>
    where
        F: Fn(A) -> Fut,
        Fut: Future,
    {
        self.debouncer.call(args, &self.f).await
    }
}

/// Per-session debouncers for the search endpoint.
#[derive(Clone)]
pub struct SearchDebouncers {
    quiet: Duration,
    cache: Cache<String, Arc<Debouncer>>,
}

impl SearchDebouncers {
    /// Create a registry whose debouncers use the given quiet period.
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_DEBOUNCERS)
            .time_to_idle(DEBOUNCER_IDLE)
            .build();

        Self { quiet, cache }
    }

    /// Get (or create) the debouncer for a session key.
    pub async fn for_key(&self, key: &str) -> Arc<Debouncer> {
        let quiet = self.quiet;
        self.cache
            .get_with(key.to_string(), async move { Arc::new(Debouncer::new(quiet)) })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_rapid_calls_collapse_to_last() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let debounced = Arc::new(Debounced::new(
            move |query: String| {
                let recorder = Arc::clone(&recorder);
                async move {
                    recorder.lock().unwrap().push(query.clone());
                    query
                }
            },
            QUIET,
        ));

        let mut handles = Vec::new();
        for query in ["p", "ph", "pho", "phon", "phone"] {
            let debounced = Arc::clone(&debounced);
            handles.push(tokio::spawn(
                async move { debounced.call(query.to_string()).await },
            ));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(
            results,
            vec![None, None, None, None, Some("phone".to_string())]
        );
        assert_eq!(*seen.lock().unwrap(), vec!["phone".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_separated_by_quiet_period_all_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(QUIET);

        for _ in 0..3 {
            let runs = Arc::clone(&runs);
            let result = debouncer
                .call((), |()| async move { runs.fetch_add(1, Ordering::SeqCst) })
                .await;
            assert!(result.is_some());
        }

        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_call_waits_for_quiet_period() {
        let debouncer = Debouncer::new(QUIET);
        let start = tokio::time::Instant::now();

        let result = debouncer.call(7, |n| async move { n * 2 }).await;

        assert_eq!(result, Some(14));
        assert!(start.elapsed() >= QUIET);
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_isolates_sessions() {
        let registry = SearchDebouncers::new(QUIET);
        let alice = registry.for_key("alice").await;
        let bob = registry.for_key("bob").await;
        let alice_again = registry.for_key("alice").await;

        assert!(Arc::ptr_eq(&alice, &alice_again));
        assert!(!Arc::ptr_eq(&alice, &bob));

        let a = tokio::spawn(async move { alice.call("a", |q| async move { q }).await });
        let b = tokio::spawn(async move { bob.call("b", |q| async move { q }).await });

        assert_eq!(a.await.unwrap(), Some("a"));
        assert_eq!(b.await.unwrap(), Some("b"));
    }
}
