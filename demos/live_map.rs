//! Replays a GPX track as a live location feed and serves the resulting map
//! scene over HTTP.
//!
//!   cargo run --example live_map -- [--log-dir <dir>] <track.gpx> [config.json]
//!
//! With `--log-dir` the crate's rotating file logger is installed instead of
//! logging to the terminal only.

use livetrail_core::config::TrackerConfig;
use livetrail_core::gpx_replay::GpxReplaySource;
use livetrail_core::renderer::{SceneServer, SharedScene};
use livetrail_core::session::Session;
use livetrail_core::tracking::{Command, TrackingController};
use livetrail_core::{import_data, logs};
use tokio::sync::mpsc;

const USAGE: &str = "usage: live_map [--log-dir <dir>] <track.gpx> [config.json]";

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1).peekable();
    if args.peek().map(String::as_str) == Some("--log-dir") {
        args.next();
        let log_dir = args.next().ok_or(USAGE)?;
        logs::init(&log_dir)?;
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .format_module_path(false)
            .init();
    }

    let gpx_path = args.next().ok_or(USAGE)?;
    let config = match args.next() {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };

    let samples = import_data::load_gpx_samples(&gpx_path)?;
    println!("loaded {} points from {}", samples.len(), gpx_path);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let source = GpxReplaySource::new(samples, config.replay_speedup);
        let (controller, events) = TrackingController::new(source, &config);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let scene = SharedScene::new();
        let mut server = SceneServer::new("localhost", 0, scene.clone(), commands_tx.clone());
        server.start()?;
        println!("================================================");
        println!("[Scene]:   GET  {}/scene", server.url().unwrap_or_default());
        println!("[Command]: POST {}/command", server.url().unwrap_or_default());
        println!("================================================");

        let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel::<()>();
        ctrlc::set_handler(move || {
            let _ = shutdown_tx.send(());
        })?;

        commands_tx.send(Command::StartTracking)?;
        let session = Session::new(controller, events, commands_rx, scene);
        tokio::select! {
            (controller, _) = session.run() => {
                println!("session ended with {} trail points", controller.trail().len());
            }
            _ = shutdown_rx.recv() => {
                // dropping the session tears the controller down, which
                // releases the replay subscription
                println!("shutting down");
            }
        }
        drop(commands_tx);
        server.stop();
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
