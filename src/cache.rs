use std::collections::HashMap;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, SystemTime};

use log::{debug, warn};
use serde_json::Value;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};

pub const DEFAULT_STALE_WINDOW: Duration = Duration::from_secs(60 * 60 * 24);
pub const DEFAULT_EVICT_AFTER: Duration = Duration::from_secs(60 * 60 * 48);

/// Structured cache key: the operation plus its identifying parameters.
/// Every fetch in the client is addressed by exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    PublicTournaments,
    AllTournaments,
    TournamentByCode(String),
    TournamentTeams(String),
    TournamentMatches(String),
    TournamentStandings(String),
    TeamRoster(String),
    Match(String),
    MatchRosters(String),
    GoalEvents(String),
    CardEvents(String),
    SubstitutionEvents(String),
}

#[derive(Debug, Clone, Copy)]
pub struct RequestOptions {
    pub stale_window: Duration,
    /// One retry on failure before surfacing the error. Tolerates a network
    /// blip without piling latency onto a clearly offline device. Mutations
    /// never go through this path.
    pub retry_once: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            stale_window: DEFAULT_STALE_WINDOW,
            retry_once: true,
        }
    }
}

impl RequestOptions {
    /// Forces a refetch regardless of entry age. Used by background polls.
    pub fn force_refresh() -> Self {
        Self {
            stale_window: Duration::ZERO,
            retry_once: false,
        }
    }
}

/// What a caller sees when peeking at a key without fetching.
#[derive(Debug, Clone)]
pub struct EntrySnapshot {
    pub value: Value,
    pub fetched_at: SystemTime,
    pub is_fresh: bool,
    pub is_fetching: bool,
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<StoredEntry>,
    fetching: bool,
    last_error: Option<ApiError>,
}

#[derive(Debug)]
struct StoredEntry {
    value: Value,
    fetched_at: SystemTime,
    stale: bool,
}

impl StoredEntry {
    fn is_fresh(&self, window: Duration) -> bool {
        !self.stale && age_of(self.fetched_at) < window
    }
}

/// Key-addressed cache of fetched payloads. One instance per process (or
/// per test), injected wherever data is read; nothing else may touch a
/// cached entry. Per key the lifecycle is
/// Empty -> Fetching -> Fresh -> Stale -> Fetching -> ..., and a failed
/// refetch drops back to Stale while keeping the last good value
/// renderable. At most one fetch per key is ever in flight; concurrent
/// requests for the same key wait and share the outcome.
pub struct CacheService {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    wakeup: Condvar,
    stale_window: Duration,
    retry_once: bool,
    evict_after: Duration,
}

impl Default for CacheService {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_WINDOW)
    }
}

impl CacheService {
    pub fn new(stale_window: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            wakeup: Condvar::new(),
            stale_window,
            retry_once: true,
            evict_after: DEFAULT_EVICT_AFTER,
        }
    }

    /// Cache honoring the configured policy: stale window, retry behavior
    /// and eviction age all come from [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            wakeup: Condvar::new(),
            stale_window: config.stale_window,
            retry_once: config.retry_once,
            evict_after: config.cache_evict_after,
        }
    }

    /// The service-wide policy as per-request options. Sessions and ad-hoc
    /// reads start from these instead of [`RequestOptions::default`] so a
    /// configured window is actually honored.
    pub fn options(&self) -> RequestOptions {
        RequestOptions {
            stale_window: self.stale_window,
            retry_once: self.retry_once,
        }
    }

    /// Peek at the cached entry for `key` without triggering a fetch.
    /// Returns the value even when stale; freshness is reported in the
    /// snapshot so the caller can decide whether to refetch. `is_fresh` is
    /// judged against the service-wide window, not any per-call override a
    /// `request` may have used.
    pub fn read(&self, key: &CacheKey) -> Option<EntrySnapshot> {
        let slots = self.slots.lock().expect("cache lock poisoned");
        let slot = slots.get(key)?;
        let entry = slot.entry.as_ref()?;
        Some(EntrySnapshot {
            value: entry.value.clone(),
            fetched_at: entry.fetched_at,
            is_fresh: entry.is_fresh(self.stale_window),
            is_fetching: slot.fetching,
        })
    }

    /// Return the cached value for `key`, fetching through `fetch_fn` only
    /// when the entry is missing or no longer fresh. Duplicate concurrent
    /// requests collapse into the single in-flight fetch. A failed refetch
    /// of a key that already holds a value serves the stale value instead
    /// of the error (offline-first: stale beats nothing).
    pub fn request<F>(&self, key: &CacheKey, options: RequestOptions, fetch_fn: F) -> ApiResult<Value>
    where
        F: Fn() -> ApiResult<Value>,
    {
        let mut slots = self.slots.lock().expect("cache lock poisoned");
        loop {
            let must_wait = {
                let slot = slots.entry(key.clone()).or_default();
                if let Some(entry) = slot.entry.as_ref() {
                    if entry.is_fresh(options.stale_window) {
                        return Ok(entry.value.clone());
                    }
                }
                if slot.fetching {
                    true
                } else {
                    slot.fetching = true;
                    slot.last_error = None;
                    false
                }
            };
            if !must_wait {
                break;
            }

            slots = self.wakeup.wait(slots).expect("cache lock poisoned");
            let slot = slots.entry(key.clone()).or_default();
            if slot.fetching {
                continue;
            }
            // The fetch we waited on has settled: share its value (or, when
            // it failed over a prior value, the stale fallback).
            if let Some(entry) = slot.entry.as_ref() {
                return Ok(entry.value.clone());
            }
            if let Some(err) = slot.last_error.clone() {
                return Err(err);
            }
        }
        drop(slots);

        let mut result = fetch_fn();
        if result.is_err() && options.retry_once {
            debug!("retrying fetch for {key:?}");
            result = fetch_fn();
        }

        let mut slots = self.slots.lock().expect("cache lock poisoned");
        let slot = slots.entry(key.clone()).or_default();
        slot.fetching = false;
        let outcome = match result {
            Ok(value) => {
                slot.entry = Some(StoredEntry {
                    value: value.clone(),
                    fetched_at: SystemTime::now(),
                    stale: false,
                });
                Ok(value)
            }
            Err(err) => {
                slot.last_error = Some(err.clone());
                match slot.entry.as_mut() {
                    Some(entry) => {
                        entry.stale = true;
                        warn!("refetch of {key:?} failed, serving stale value: {err}");
                        Ok(entry.value.clone())
                    }
                    None => Err(err),
                }
            }
        };
        self.wakeup.notify_all();
        outcome
    }

    /// Mark the entry for `key` stale. The value is kept: a read before the
    /// next refetch completes still returns it, so the screen never drops
    /// to empty mid-refresh.
    pub fn invalidate(&self, key: &CacheKey) {
        let mut slots = self.slots.lock().expect("cache lock poisoned");
        if let Some(entry) = slots.get_mut(key).and_then(|slot| slot.entry.as_mut()) {
            entry.stale = true;
            debug!("invalidated {key:?}");
        }
    }

    /// Mark every entry whose key matches `pred` stale.
    pub fn invalidate_where(&self, pred: impl Fn(&CacheKey) -> bool) {
        let mut slots = self.slots.lock().expect("cache lock poisoned");
        for (key, slot) in slots.iter_mut() {
            if pred(key) {
                if let Some(entry) = slot.entry.as_mut() {
                    entry.stale = true;
                    debug!("invalidated {key:?}");
                }
            }
        }
    }

    /// Evict entries older than the configured eviction age. Run by the
    /// background refresh loop after each round.
    pub fn purge_expired(&self) {
        self.purge_older_than(self.evict_after);
    }

    /// Evict entries not refreshed within `age`. In-flight slots are kept.
    pub fn purge_older_than(&self, age: Duration) {
        let mut slots = self.slots.lock().expect("cache lock poisoned");
        slots.retain(|_, slot| {
            slot.fetching
                || slot
                    .entry
                    .as_ref()
                    .is_some_and(|entry| age_of(entry.fetched_at) < age)
        });
    }

    pub fn len(&self) -> usize {
        self.slots.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn age_of(fetched_at: SystemTime) -> Duration {
    SystemTime::now()
        .duration_since(fetched_at)
        .unwrap_or(Duration::ZERO)
}
