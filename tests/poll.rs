use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::json;

use pitchside::cache::{CacheKey, CacheService};
use pitchside::config::Config;
use pitchside::error::ApiError;
use pitchside::poll::{self, job};

#[test]
fn refresh_bypasses_the_freshness_window() {
    let cache = Arc::new(CacheService::default());
    let rounds = Arc::new(AtomicUsize::new(0));
    let key = CacheKey::Match("m-live".to_string());

    let counter = rounds.clone();
    let handle = poll::spawn_refresh(
        cache.clone(),
        vec![job(key.clone(), move || {
            let round = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(json!({ "round": round }))
        })],
        Duration::from_millis(30),
    );

    thread::sleep(Duration::from_millis(130));
    handle.stop_and_join();

    // A fresh 24h entry would normally suppress refetches; the poll forces
    // one per round instead.
    assert!(rounds.load(Ordering::SeqCst) >= 3);
    let snapshot = cache.read(&key).expect("poll should populate the key");
    assert!(snapshot.is_fresh);
}

#[test]
fn cancel_stops_future_rounds() {
    let cache = Arc::new(CacheService::default());
    let rounds = Arc::new(AtomicUsize::new(0));

    let counter = rounds.clone();
    let handle = poll::spawn_refresh(
        cache,
        vec![job(CacheKey::GoalEvents("m-live".to_string()), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(json!([]))
        })],
        Duration::from_millis(20),
    );

    thread::sleep(Duration::from_millis(60));
    assert!(!handle.is_cancelled());
    handle.stop_and_join();

    let after_cancel = rounds.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(80));
    assert_eq!(rounds.load(Ordering::SeqCst), after_cancel);
}

#[test]
fn failed_refresh_keeps_the_stale_value_renderable() {
    let cache = Arc::new(CacheService::default());
    let key = CacheKey::CardEvents("m-live".to_string());
    let attempts = Arc::new(AtomicUsize::new(0));

    let counter = attempts.clone();
    let handle = poll::spawn_refresh(
        cache.clone(),
        vec![job(key.clone(), move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(json!([ { "id": "c1", "player_id": "p1", "card_type": "yellow" } ]))
            } else {
                Err(ApiError::Network("dropped wifi".to_string()))
            }
        })],
        Duration::from_millis(25),
    );

    thread::sleep(Duration::from_millis(110));
    handle.stop_and_join();

    assert!(attempts.load(Ordering::SeqCst) >= 2);
    let snapshot = cache.read(&key).expect("first round's value should survive");
    assert_eq!(snapshot.value[0]["id"], "c1");
    assert!(!snapshot.is_fresh);
}

#[test]
fn poll_rounds_evict_entries_past_the_configured_age() {
    let config = Config {
        cache_evict_after: Duration::from_millis(80),
        ..Config::default()
    };
    let cache = Arc::new(CacheService::from_config(&config));
    let abandoned = CacheKey::TeamRoster("team-gone".to_string());
    let live = CacheKey::Match("m-live".to_string());

    cache
        .request(&abandoned, cache.options(), || Ok(json!({ "id": "team-gone" })))
        .unwrap();

    let handle = poll::spawn_refresh(
        cache.clone(),
        vec![job(live.clone(), move || Ok(json!({ "id": "m-live" })))],
        Duration::from_millis(25),
    );
    thread::sleep(Duration::from_millis(140));
    handle.stop_and_join();

    // The polled key is refreshed every round and survives; the abandoned
    // one aged past the eviction threshold and was purged.
    assert!(cache.read(&abandoned).is_none());
    assert!(cache.read(&live).is_some());
}

#[test]
fn dropping_the_handle_cancels_the_subscription() {
    let rounds = Arc::new(AtomicUsize::new(0));

    {
        let counter = rounds.clone();
        let _handle = poll::spawn_refresh(
            Arc::new(CacheService::default()),
            vec![job(CacheKey::Match("m-live".to_string()), move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!({}))
            })],
            Duration::from_millis(20),
        );
        thread::sleep(Duration::from_millis(50));
    }

    // Handle dropped: at most the in-flight round may still land.
    thread::sleep(Duration::from_millis(30));
    let settled = rounds.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(80));
    assert_eq!(rounds.load(Ordering::SeqCst), settled);
}
