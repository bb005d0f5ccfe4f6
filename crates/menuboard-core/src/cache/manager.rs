use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::MenuData;

/// Default freshness window for the assembled menu.
/// Menu edits are admin-rate, so five minutes of staleness for other readers is fine.
pub const DEFAULT_CACHE_TTL_MINUTES: i64 = 5;

/// Source of the current time. Tests swap in a manual clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T, cached_at: DateTime<Utc>) -> Self {
        Self { data, cached_at }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.cached_at
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }

    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        let seconds = self.age(now).num_seconds();
        if seconds < 60 {
            // Covers clock skew too
            "just now".to_string()
        } else if seconds < 3600 {
            format!("{}m ago", seconds / 60)
        } else {
            format!("{}h ago", seconds / 3600)
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<CachedData<MenuData>>,
    // Bumped by every invalidate; a refresh only stores if it has not moved.
    generation: u64,
}

/// Single-slot cache for the assembled menu.
///
/// Any write to the catalog invalidates the whole tree. Concurrent misses
/// are collapsed into one refresh.
pub struct MenuCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Slot>,
    refresh: tokio::sync::Mutex<()>,
}

impl MenuCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(Slot::default()),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        // The slot holds plain data, so a poisoned lock is still usable.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached menu, if one exists and is still inside the TTL.
    pub fn get(&self) -> Option<MenuData> {
        let now = self.clock.now();
        let slot = self.slot();
        slot.entry
            .as_ref()
            .filter(|cached| cached.is_fresh(now, self.ttl))
            .map(|cached| cached.data.clone())
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot();
        slot.entry = None;
        slot.generation += 1;
        debug!(generation = slot.generation, "Menu cache invalidated");
    }

    /// Age of the cached menu for display, or `None` when nothing is cached.
    pub fn age_display(&self) -> Option<String> {
        let now = self.clock.now();
        self.slot().entry.as_ref().map(|cached| cached.age_display(now))
    }

    fn store_if_current(&self, data: &MenuData, generation: u64) {
        let mut slot = self.slot();
        if slot.generation == generation {
            slot.entry = Some(CachedData::new(data.clone(), self.clock.now()));
        } else {
            debug!("Menu changed during refresh, not caching the result");
        }
    }

    /// Return the cached menu or run `fetch` to rebuild it.
    ///
    /// Only successful results are cached. A result whose refresh started
    /// before an `invalidate()` is returned to its caller but not stored.
    pub async fn get_or_refresh<F, Fut, E>(&self, fetch: F) -> Result<MenuData, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MenuData, E>>,
    {
        if let Some(menu) = self.get() {
            debug!("Menu cache hit");
            return Ok(menu);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(menu) = self.get() {
            debug!("Menu cache filled by concurrent refresh");
            return Ok(menu);
        }

        debug!("Menu cache miss, fetching");
        let generation = self.slot().generation;
        let menu = fetch().await?;
        self.store_if_current(&menu, generation);
        Ok(menu)
    }
}

impl Default for MenuCache {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_CACHE_TTL_MINUTES))
    }
}
