//! Time-bounded pricing cache
//!
//! Explicit, injectable cache object: construct once per process, share via
//! `Arc`. `current()` is total: it always hands back a usable table. Live
//! data is held for the configured TTL; a failed refresh degrades to the
//! hand-maintained fallback table for a short cooldown instead of surfacing
//! an error or hammering the upstream.
//!
//! Concurrency: readers of a fresh snapshot never block. Stale callers
//! serialize on a refresh guard, and the double-check after acquiring it
//! keeps the whole stale period down to a single network fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;

use super::fallback::fallback_table;
use super::fetcher::PriceFetcher;
use super::types::{PricingEntry, PricingTable, TableSource};

pub(crate) const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// How long a failed refresh parks on fallback data before the next
/// attempt.
const FAILURE_COOLDOWN: Duration = Duration::from_secs(60);

struct CacheSlot {
    table: Arc<PricingTable>,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheSlot {
    fn fresh_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

pub(crate) struct PricingCache {
    fetcher: Box<dyn PriceFetcher>,
    ttl: Duration,
    quiet: bool,
    snapshot: RwLock<Option<CacheSlot>>,
    refresh: Mutex<()>,
    last_error: RwLock<Option<String>>,
}

impl PricingCache {
    pub(crate) fn new(fetcher: Box<dyn PriceFetcher>, ttl: Duration, quiet: bool) -> Self {
        Self {
            fetcher,
            ttl,
            quiet,
            snapshot: RwLock::new(None),
            refresh: Mutex::new(()),
            last_error: RwLock::new(None),
        }
    }

    /// Cache that never touches the network: pre-seeded with the fallback
    /// table and pinned fresh for the process lifetime.
    pub(crate) fn offline(quiet: bool) -> Self {
        let cache = Self::new(Box::new(OfflineFetcher), Duration::MAX, quiet);
        let table = Arc::new(fallback_table());
        *write_lock(&cache.snapshot) = Some(CacheSlot {
            table,
            stored_at: Instant::now(),
            ttl: Duration::MAX,
        });
        cache
    }

    /// Current pricing snapshot. Total: never fails, never blocks a caller
    /// that a still-fresh snapshot can serve.
    pub(crate) fn current(&self) -> Arc<PricingTable> {
        self.current_at(Instant::now())
    }

    /// Why the latest refresh fell back, if it did.
    pub(crate) fn last_error(&self) -> Option<String> {
        read_lock(&self.last_error).clone()
    }

    fn current_at(&self, now: Instant) -> Arc<PricingTable> {
        if let Some(table) = self.fresh_snapshot(now) {
            return table;
        }

        // Single-flight: one fetch per stale period. Concurrent callers
        // queue here and are served by the double-check below.
        let _guard = lock(&self.refresh);
        if let Some(table) = self.fresh_snapshot(now) {
            return table;
        }

        match self.fetcher.fetch() {
            Ok(entries) => {
                let table = Arc::new(live_table(entries));
                if !self.quiet {
                    eprintln!("Fetched pricing for {} models", table.len());
                }
                self.store(table.clone(), now, self.ttl);
                *write_lock(&self.last_error) = None;
                table
            }
            Err(err) => {
                if !self.quiet {
                    eprintln!("Warning: pricing fetch failed ({err}), using fallback rates");
                }
                let table = Arc::new(fallback_table());
                self.store(table.clone(), now, FAILURE_COOLDOWN.min(self.ttl));
                *write_lock(&self.last_error) = Some(err.to_string());
                table
            }
        }
    }

    fn fresh_snapshot(&self, now: Instant) -> Option<Arc<PricingTable>> {
        let guard = read_lock(&self.snapshot);
        let slot = guard.as_ref()?;
        slot.fresh_at(now).then(|| slot.table.clone())
    }

    fn store(&self, table: Arc<PricingTable>, now: Instant, ttl: Duration) {
        *write_lock(&self.snapshot) = Some(CacheSlot {
            table,
            stored_at: now,
            ttl,
        });
    }
}

fn live_table(entries: Vec<PricingEntry>) -> PricingTable {
    let mut models = HashMap::new();
    for entry in entries {
        models.insert(entry.model_id.clone(), entry);
    }
    PricingTable {
        models,
        fetched_at: Utc::now(),
        source: TableSource::Live,
    }
}

struct OfflineFetcher;

impl PriceFetcher for OfflineFetcher {
    fn fetch(&self) -> Result<Vec<PricingEntry>, crate::error::FetchError> {
        Err(crate::error::FetchError::Transport(
            "offline mode".to_string(),
        ))
    }
}

// A poisoned lock only means another thread panicked mid-update of a value
// we overwrite wholesale; recover the guard instead of propagating.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    impl CountingFetcher {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                delay: Duration::ZERO,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
                delay: Duration::ZERO,
            }
        }

        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PriceFetcher for CountingFetcher {
        fn fetch(&self) -> Result<Vec<PricingEntry>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            if self.fail {
                return Err(FetchError::Transport("connection refused".to_string()));
            }
            Ok(vec![PricingEntry {
                model_id: "openai/gpt-4".to_string(),
                prompt_cost_per_token: 0.00003,
                completion_cost_per_token: 0.00006,
                context_length: 8192,
                source: TableSource::Live,
            }])
        }
    }

    fn cache_with(fetcher: CountingFetcher) -> (Arc<PricingCache>, Arc<CountingFetcher>) {
        let fetcher = Arc::new(fetcher);
        let handle = fetcher.clone();
        struct Shared(Arc<CountingFetcher>);
        impl PriceFetcher for Shared {
            fn fetch(&self) -> Result<Vec<PricingEntry>, FetchError> {
                self.0.fetch()
            }
        }
        (
            Arc::new(PricingCache::new(
                Box::new(Shared(fetcher)),
                DEFAULT_TTL,
                true,
            )),
            handle,
        )
    }

    #[test]
    fn fresh_hit_skips_the_fetcher() {
        let (cache, fetcher) = cache_with(CountingFetcher::ok());
        let t0 = Instant::now();
        let first = cache.current_at(t0);
        let second = cache.current_at(t0 + Duration::from_secs(30));
        assert_eq!(fetcher.count(), 1);
        assert_eq!(first.source, TableSource::Live);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn stale_snapshot_triggers_one_refresh() {
        let (cache, fetcher) = cache_with(CountingFetcher::ok());
        let t0 = Instant::now();
        cache.current_at(t0);
        cache.current_at(t0 + DEFAULT_TTL + Duration::from_secs(1));
        assert_eq!(fetcher.count(), 2);
    }

    #[test]
    fn failed_fetch_degrades_to_fallback_without_error() {
        let (cache, fetcher) = cache_with(CountingFetcher::failing());
        let t0 = Instant::now();
        let table = cache.current_at(t0);
        assert_eq!(fetcher.count(), 1);
        assert_eq!(table.source, TableSource::Fallback);
        assert!(!table.models.is_empty());
        for entry in table.models.values() {
            assert!(entry.prompt_cost_per_token >= 0.0);
            assert!(entry.completion_cost_per_token >= 0.0);
        }
        assert!(cache.last_error().is_some());
    }

    #[test]
    fn failure_cooldown_suppresses_immediate_retries() {
        let (cache, fetcher) = cache_with(CountingFetcher::failing());
        let t0 = Instant::now();
        cache.current_at(t0);
        cache.current_at(t0 + Duration::from_secs(5));
        assert_eq!(fetcher.count(), 1);
        // Past the cooldown the next caller tries again.
        cache.current_at(t0 + Duration::from_secs(120));
        assert_eq!(fetcher.count(), 2);
    }

    #[test]
    fn successful_refresh_clears_last_error() {
        let fetcher = Arc::new(CountingFetcher::ok());
        struct Flaky {
            inner: Arc<CountingFetcher>,
        }
        impl PriceFetcher for Flaky {
            fn fetch(&self) -> Result<Vec<PricingEntry>, FetchError> {
                if self.inner.calls.load(Ordering::SeqCst) == 0 {
                    self.inner.calls.fetch_add(1, Ordering::SeqCst);
                    return Err(FetchError::Timeout);
                }
                self.inner.fetch()
            }
        }
        let cache = PricingCache::new(
            Box::new(Flaky {
                inner: fetcher.clone(),
            }),
            DEFAULT_TTL,
            true,
        );
        let t0 = Instant::now();
        assert_eq!(cache.current_at(t0).source, TableSource::Fallback);
        assert!(cache.last_error().is_some());

        let table = cache.current_at(t0 + Duration::from_secs(120));
        assert_eq!(table.source, TableSource::Live);
        assert!(cache.last_error().is_none());
    }

    #[test]
    fn concurrent_stale_callers_share_one_fetch() {
        let (cache, fetcher) = cache_with(CountingFetcher {
            calls: AtomicUsize::new(0),
            fail: false,
            delay: Duration::from_millis(50),
        });
        let t0 = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(std::thread::spawn(move || cache.current_at(t0)));
        }
        for handle in handles {
            let table = handle.join().unwrap();
            assert_eq!(table.source, TableSource::Live);
        }
        assert_eq!(fetcher.count(), 1);
    }

    #[test]
    fn offline_cache_never_fetches() {
        let cache = PricingCache::offline(true);
        let table = cache.current();
        assert_eq!(table.source, TableSource::Fallback);
        assert!(table.get("openai/gpt-4").is_some());
        assert!(cache.last_error().is_none());
    }
}
