use tokio::sync::mpsc::UnboundedReceiver;

use crate::position_source::{PositionEvent, PositionSource};
use crate::renderer::{derive_scene, ViewPresenter};
use crate::tracking::{Command, TrackingController};

/// Drives a tracking controller: waits for the next position event or user
/// command, applies it, and presents the new scene before waiting again.
///
/// The session ends when every command sender is dropped. Tracking is stopped
/// on the way out, so no subscription outlives the session.
pub struct Session<S: PositionSource, P: ViewPresenter> {
    controller: TrackingController<S>,
    events: UnboundedReceiver<PositionEvent>,
    commands: UnboundedReceiver<Command>,
    presenter: P,
}

impl<S: PositionSource, P: ViewPresenter> Session<S, P> {
    pub fn new(
        controller: TrackingController<S>,
        events: UnboundedReceiver<PositionEvent>,
        commands: UnboundedReceiver<Command>,
        presenter: P,
    ) -> Self {
        Session {
            controller,
            events,
            commands,
            presenter,
        }
    }

    pub fn controller(&self) -> &TrackingController<S> {
        &self.controller
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    fn present(&mut self) {
        let scene = derive_scene(&self.controller.scene_state());
        self.presenter.present(self.controller.viewport(), &scene);
    }

    fn apply_command(&mut self, command: Command) {
        // a failed `start` is already reflected in the controller's error,
        // which the next scene shows
        if let Err(e) = self.controller.dispatch(command) {
            info!("command rejected: {e}");
        }
    }

    /// Applies whatever is queued right now without waiting for more.
    /// Returns the number of events and commands processed.
    ///
    /// Queued commands go before queued position events, whatever order they
    /// arrived in: a queued `StopTracking` wins over samples delivered before
    /// it, and those samples are then dropped as arriving while idle.
    pub fn run_pending(&mut self) -> usize {
        let mut processed = 0;
        loop {
            if let Ok(command) = self.commands.try_recv() {
                self.apply_command(command);
            } else if let Ok(event) = self.events.try_recv() {
                self.controller.handle_event(event);
            } else {
                break;
            }
            processed += 1;
            self.present();
        }
        processed
    }

    /// Runs until every command sender is gone. When both a command and a
    /// position event are ready, the command is applied first, same as
    /// `run_pending`.
    pub async fn run(mut self) -> (TrackingController<S>, P) {
        self.present();
        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(command) => self.apply_command(command),
                    None => break,
                },
                Some(event) = self.events.recv() => {
                    self.controller.handle_event(event);
                }
            }
            self.present();
        }
        info!("command channel closed, ending session");
        self.controller.stop();
        self.present();
        (self.controller, self.presenter)
    }
}
