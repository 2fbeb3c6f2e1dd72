use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::coordinate::PositionSample;
use crate::position_source::{
    EventSink, PositionOptions, PositionSource, SourceError, WatchId,
};

/// Plays back a recorded track as if it was coming from a GPS receiver.
///
/// Each watch replays the whole track from the beginning on a tokio task,
/// sleeping for the recorded gap between points divided by `speedup`. A gap
/// longer than the watch's `timeout_ms` is reported as a timeout, the same way
/// a receiver losing its fix would be.
pub struct GpxReplaySource {
    samples: Arc<Vec<PositionSample>>,
    speedup: f64,
    next_watch: WatchId,
    watches: HashMap<WatchId, JoinHandle<()>>,
    // last replayed fix and when it was delivered
    latest: Arc<Mutex<Option<(Instant, PositionSample)>>>,
}

impl GpxReplaySource {
    pub fn new(samples: Vec<PositionSample>, speedup: f64) -> Self {
        GpxReplaySource {
            samples: Arc::new(samples),
            speedup: if speedup > 0.0 { speedup } else { 1.0 },
            next_watch: 1,
            watches: HashMap::new(),
            latest: Arc::new(Mutex::new(None)),
        }
    }

    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }

    fn replay_delay(&self, from: &PositionSample, to: &PositionSample) -> Duration {
        let gap_ms = (to.timestamp_ms - from.timestamp_ms).max(0) as f64;
        Duration::try_from_secs_f64(gap_ms / 1000.0 / self.speedup).unwrap_or(Duration::MAX)
    }
}

impl PositionSource for GpxReplaySource {
    fn is_supported(&self) -> bool {
        !self.samples.is_empty()
    }

    fn subscribe(&mut self, sink: EventSink, options: &PositionOptions) -> WatchId {
        let watch = self.next_watch;
        self.next_watch += 1;

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!("cannot replay without a tokio runtime: {e}");
                sink.error(SourceError::Other("no async runtime".to_string()));
                return watch;
            }
        };

        let delays: Vec<Duration> = self
            .samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .map(|(from, to)| self.replay_delay(from, to))
            .collect();
        let samples = self.samples.clone();
        let latest = self.latest.clone();
        let timeout = match options.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        let task = handle.spawn(async move {
            for (i, sample) in samples.iter().enumerate() {
                if i > 0 {
                    let delay = delays[i - 1];
                    if let Some(timeout) = timeout.filter(|timeout| delay > *timeout) {
                        tokio::time::sleep(timeout).await;
                        sink.error(SourceError::Timeout);
                        return;
                    }
                    tokio::time::sleep(delay).await;
                }
                *latest.lock().unwrap() = Some((Instant::now(), sample.clone()));
                if !sink.sample(sample.clone()) {
                    return;
                }
            }
            info!("replay of watch {watch} finished");
        });
        self.watches.insert(watch, task);
        watch
    }

    fn unsubscribe(&mut self, watch: WatchId) {
        match self.watches.remove(&watch) {
            Some(task) => task.abort(),
            None => warn!("unsubscribing unknown watch {watch}"),
        }
    }

    fn fetch_once(&mut self, sink: EventSink, options: &PositionOptions) {
        let max_age = Duration::from_millis(options.max_cache_age_ms);
        let cached = self
            .latest
            .lock()
            .unwrap()
            .as_ref()
            .filter(|_| options.max_cache_age_ms > 0)
            .filter(|(delivered_at, _)| delivered_at.elapsed() <= max_age)
            .map(|(_, sample)| sample.clone());
        match cached.or_else(|| self.samples.first().cloned()) {
            Some(sample) => sink.sample(sample),
            None => sink.error(SourceError::PositionUnavailable),
        };
    }
}

impl Drop for GpxReplaySource {
    fn drop(&mut self) {
        for (_, task) in self.watches.drain() {
            task.abort();
        }
    }
}
