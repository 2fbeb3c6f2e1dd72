use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

use crate::coordinate::PositionSample;

/// Generation number minted by the tracking controller on every `start`.
pub type SessionId = u64;
/// Handle of a continuous subscription, owned by the position source.
pub type WatchId = u64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "Location permission denied"),
            Self::PositionUnavailable => write!(f, "Location information is unavailable"),
            Self::Timeout => write!(f, "Location request timed out"),
            Self::Other(message) => write!(f, "Location error: {message}"),
        }
    }
}

impl std::error::Error for SourceError {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub max_cache_age_ms: u64,
}

impl Default for PositionOptions {
    fn default() -> Self {
        PositionOptions {
            high_accuracy: true,
            timeout_ms: 5000,
            max_cache_age_ms: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PositionEventKind {
    Sample(PositionSample),
    Error(SourceError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PositionEvent {
    pub session: SessionId,
    pub kind: PositionEventKind,
}

/// Where a position source delivers to. Every delivery is tagged with the
/// session the sink was handed out for, so the receiving side can tell
/// leftovers of an earlier subscription apart from current ones.
#[derive(Clone, Debug)]
pub struct EventSink {
    session: SessionId,
    tx: UnboundedSender<PositionEvent>,
}

impl EventSink {
    pub fn new(session: SessionId, tx: UnboundedSender<PositionEvent>) -> Self {
        EventSink { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Returns `false` once nobody is listening anymore.
    pub fn sample(&self, sample: PositionSample) -> bool {
        self.send(PositionEventKind::Sample(sample))
    }

    pub fn error(&self, error: SourceError) -> bool {
        self.send(PositionEventKind::Error(error))
    }

    fn send(&self, kind: PositionEventKind) -> bool {
        self.tx
            .send(PositionEvent {
                session: self.session,
                kind,
            })
            .is_ok()
    }
}

/// A platform geolocation capability.
///
/// Implementations must stop delivering to a watch's sink once `unsubscribe`
/// returns for it.
pub trait PositionSource {
    fn is_supported(&self) -> bool;

    fn subscribe(&mut self, sink: EventSink, options: &PositionOptions) -> WatchId;

    fn unsubscribe(&mut self, watch: WatchId);

    /// Delivers exactly one sample or error to `sink`.
    fn fetch_once(&mut self, sink: EventSink, options: &PositionOptions);
}

/// A position source driven by its owner: whatever hosts the tracker (a UI
/// shell, an FFI layer, a test) pushes fixes in as they come.
pub struct ManualPositionSource {
    supported: bool,
    next_watch: WatchId,
    watches: HashMap<WatchId, EventSink>,
    pending_fetches: Vec<EventSink>,
    subscribe_count: usize,
    unsubscribe_count: usize,
}

impl ManualPositionSource {
    pub fn new() -> Self {
        ManualPositionSource {
            supported: true,
            next_watch: 1,
            watches: HashMap::new(),
            pending_fetches: Vec::new(),
            subscribe_count: 0,
            unsubscribe_count: 0,
        }
    }

    pub fn unsupported() -> Self {
        ManualPositionSource {
            supported: false,
            ..Self::new()
        }
    }

    /// Sends `sample` to every live watch. Returns how many watches got it.
    pub fn push_sample(&mut self, sample: &PositionSample) -> usize {
        self.watches
            .values()
            .filter(|sink| sink.sample(sample.clone()))
            .count()
    }

    pub fn push_error(&mut self, error: &SourceError) -> usize {
        self.watches
            .values()
            .filter(|sink| sink.error(error.clone()))
            .count()
    }

    /// Answers every outstanding `fetch_once` request.
    pub fn resolve_fetches(&mut self, result: Result<PositionSample, SourceError>) -> usize {
        let pending = std::mem::take(&mut self.pending_fetches);
        pending
            .iter()
            .filter(|sink| match &result {
                Ok(sample) => sink.sample(sample.clone()),
                Err(error) => sink.error(error.clone()),
            })
            .count()
    }

    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }

    pub fn pending_fetches(&self) -> usize {
        self.pending_fetches.len()
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribe_count
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribe_count
    }
}

impl PositionSource for ManualPositionSource {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn subscribe(&mut self, sink: EventSink, _options: &PositionOptions) -> WatchId {
        let watch = self.next_watch;
        self.next_watch += 1;
        self.subscribe_count += 1;
        self.watches.insert(watch, sink);
        watch
    }

    fn unsubscribe(&mut self, watch: WatchId) {
        self.unsubscribe_count += 1;
        if self.watches.remove(&watch).is_none() {
            warn!("unsubscribing unknown watch {watch}");
        }
    }

    fn fetch_once(&mut self, sink: EventSink, _options: &PositionOptions) {
        self.pending_fetches.push(sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;
    use tokio::sync::mpsc;

    #[test]
    fn sink_tags_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(7, tx);
        let sample = PositionSample::new(Coordinate::new(1.0, 2.0).unwrap(), 1000);
        assert!(sink.sample(sample.clone()));
        assert!(sink.error(SourceError::Timeout));
        assert_eq!(
            rx.try_recv().unwrap(),
            PositionEvent {
                session: 7,
                kind: PositionEventKind::Sample(sample)
            }
        );
        assert_eq!(rx.try_recv().unwrap().session, 7);
        drop(rx);
        assert!(!sink.error(SourceError::Timeout));
    }

    #[test]
    fn manual_source_stops_delivering_after_unsubscribe() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut source = ManualPositionSource::new();
        let watch = source.subscribe(EventSink::new(1, tx), &PositionOptions::default());
        let sample = PositionSample::new(Coordinate::new(1.0, 2.0).unwrap(), 1000);
        assert_eq!(source.push_sample(&sample), 1);
        source.unsubscribe(watch);
        assert_eq!(source.push_sample(&sample), 0);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
        assert_eq!(source.subscribe_count(), 1);
        assert_eq!(source.unsubscribe_count(), 1);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            SourceError::PermissionDenied.to_string(),
            "Location permission denied"
        );
        assert_eq!(
            SourceError::Other("gps off".to_string()).to_string(),
            "Location error: gps off"
        );
    }
}
