use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;

use crate::cache::{CacheKey, CacheService, RequestOptions};
use crate::error::ApiResult;

/// One key refreshed on every poll round.
pub struct PollJob {
    pub key: CacheKey,
    pub fetch: Box<dyn Fn() -> ApiResult<Value> + Send + Sync>,
}

pub fn job<F>(key: CacheKey, fetch: F) -> PollJob
where
    F: Fn() -> ApiResult<Value> + Send + Sync + 'static,
{
    PollJob {
        key,
        fetch: Box::new(fetch),
    }
}

/// Cancel handle returned at subscribe time. Cancelling (or dropping)
/// stops further rounds; a round already in flight is allowed to complete
/// and populate the cache for potential reuse.
pub struct PollHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Cancel and wait for the refresh thread to wind down. Tests use this;
    /// screens just drop the handle.
    pub fn stop_and_join(mut self) {
        self.cancel();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Background refresh subscription: re-requests every job's key each
/// `interval`, bypassing the freshness window so the cache tracks the
/// backend while the screen is visible. Failures are logged and the stale
/// entry stays renderable; the next round tries again.
pub fn spawn_refresh(
    cache: Arc<CacheService>,
    jobs: Vec<PollJob>,
    interval: Duration,
) -> PollHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();

    let thread = thread::spawn(move || {
        let options = RequestOptions::force_refresh();
        while !flag.load(Ordering::SeqCst) {
            for job in &jobs {
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                match cache.request(&job.key, options, || (job.fetch)()) {
                    Ok(_) => debug!("refreshed {:?}", job.key),
                    Err(err) => warn!("background refresh of {:?} failed: {err}", job.key),
                }
            }
            cache.purge_expired();
            // Sleep in short steps so cancellation takes effect promptly.
            let step = Duration::from_millis(50).min(interval);
            let mut slept = Duration::ZERO;
            while slept < interval && !flag.load(Ordering::SeqCst) {
                thread::sleep(step);
                slept += step;
            }
        }
    });

    PollHandle {
        stop,
        thread: Some(thread),
    }
}
