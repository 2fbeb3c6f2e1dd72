use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::{PointOfInterest, TrackerConfig};
use crate::coordinate::PositionSample;
use crate::position_source::{
    EventSink, PositionEvent, PositionEventKind, PositionOptions, PositionSource, SessionId,
    WatchId,
};
use crate::renderer::scene::SceneState;
use crate::trail::{OfferResult, TrailAccumulator};
use crate::viewport::ViewportState;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrackingState {
    Idle,
    Active,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackingError {
    UnsupportedCapability,
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedCapability => {
                write!(f, "Geolocation is not supported on this device")
            }
        }
    }
}

impl std::error::Error for TrackingError {}

/// Everything a user (or the view on their behalf) can ask for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload")]
#[serde(rename_all = "snake_case")]
pub enum Command {
    StartTracking,
    StopTracking,
    ToggleTrail,
    ClearTrail,
    ViewportChanged(ViewportState),
}

/// Owns the live-location session: whether we are subscribed to the
/// position source, the trail, the camera and the last known location.
///
/// Position events reach the controller through the receiver returned by
/// `new`; whoever drives the controller feeds them back into
/// `handle_event` one at a time.
pub struct TrackingController<S: PositionSource> {
    source: S,
    options: PositionOptions,
    tx: UnboundedSender<PositionEvent>,
    state: TrackingState,
    session: SessionId,
    watch: Option<WatchId>,
    trail: TrailAccumulator,
    viewport: ViewportState,
    user_location: Option<PositionSample>,
    error: Option<String>,
    point_of_interest: PointOfInterest,
}

impl<S: PositionSource> TrackingController<S> {
    pub fn new(source: S, config: &TrackerConfig) -> (Self, UnboundedReceiver<PositionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = TrackingController {
            source,
            options: config.position_options.clone(),
            tx,
            state: TrackingState::Idle,
            session: 0,
            watch: None,
            trail: TrailAccumulator::with_epsilon(config.epsilon),
            viewport: ViewportState::new(
                config.point_of_interest.coordinate,
                config.initial_zoom,
            ),
            user_location: None,
            error: None,
            point_of_interest: config.point_of_interest.clone(),
        };
        (controller, rx)
    }

    pub fn dispatch(&mut self, command: Command) -> Result<(), TrackingError> {
        debug!("dispatching command: {command:?}");
        match command {
            Command::StartTracking => return self.start(),
            Command::StopTracking => self.stop(),
            Command::ToggleTrail => {
                let visible = self.trail.toggle_visibility();
                info!("trail visibility: {visible}");
            }
            Command::ClearTrail => self.trail.clear(),
            Command::ViewportChanged(viewport) => self.viewport = viewport,
        }
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), TrackingError> {
        if self.state == TrackingState::Active {
            debug!("`start` called while already tracking");
            return Ok(());
        }
        if !self.source.is_supported() {
            let error = TrackingError::UnsupportedCapability;
            warn!("cannot start tracking: {error}");
            self.error = Some(error.to_string());
            return Err(error);
        }

        self.session = self.session.wrapping_add(1);
        let sink = EventSink::new(self.session, self.tx.clone());
        self.watch = Some(self.source.subscribe(sink.clone(), &self.options));
        // Continuous updates can take a while to show up, ask for a fix right
        // away as well. Both paths end up in `handle_event`.
        self.source.fetch_once(sink, &self.options);
        self.state = TrackingState::Active;
        info!("tracking started, session {}", self.session);
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.state == TrackingState::Idle {
            return;
        }
        self.release();
        self.state = TrackingState::Idle;
        info!("tracking stopped, session {}", self.session);
    }

    /// Applies one event from the position source. Returns the trail filter
    /// outcome when the event was an accepted sample.
    pub fn handle_event(&mut self, event: PositionEvent) -> Option<OfferResult> {
        if self.state != TrackingState::Active || event.session != self.session {
            debug!(
                "dropping event of session {} (current: {}, {})",
                event.session, self.session, self.state
            );
            return None;
        }
        match event.kind {
            PositionEventKind::Sample(sample) => Some(self.accept(sample)),
            PositionEventKind::Error(error) => {
                warn!("position source failed: {error}");
                self.error = Some(error.to_string());
                self.release();
                self.state = TrackingState::Idle;
                None
            }
        }
    }

    fn accept(&mut self, sample: PositionSample) -> OfferResult {
        let result = self.trail.offer(&sample);
        self.viewport.follow(sample.coordinate);
        self.error = None;
        self.user_location = Some(sample);
        result
    }

    fn release(&mut self) {
        if let Some(watch) = self.watch.take() {
            self.source.unsubscribe(watch);
            debug!("released watch {watch}");
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TrackingState::Active
    }

    pub fn trail(&self) -> &TrailAccumulator {
        &self.trail
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn user_location(&self) -> Option<&PositionSample> {
        self.user_location.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn point_of_interest(&self) -> &PointOfInterest {
        &self.point_of_interest
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn scene_state(&self) -> SceneState<'_> {
        SceneState {
            viewport: &self.viewport,
            user_location: self.user_location.as_ref(),
            trail: &self.trail,
            tracking_state: self.state,
            error: self.error.as_deref(),
            point_of_interest: &self.point_of_interest,
        }
    }
}

impl<S: PositionSource> Drop for TrackingController<S> {
    fn drop(&mut self) {
        self.release();
    }
}
