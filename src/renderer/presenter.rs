use serde::Serialize;
use std::sync::{Arc, RwLock};

use crate::renderer::scene::Scene;
use crate::viewport::ViewportState;

/// The thing that actually draws. It gets the camera and the scene after
/// every change; user camera moves go back in as
/// `Command::ViewportChanged`.
pub trait ViewPresenter {
    fn present(&mut self, viewport: &ViewportState, scene: &Scene);
}

#[derive(Serialize)]
struct Frame<'a> {
    version: String,
    viewport: &'a ViewportState,
    scene: &'a Scene,
}

struct Latest {
    version: u64,
    // the frame rendered without its version, used to detect real changes
    content: String,
    body: String,
}

/// Keeps the latest presented frame as JSON so it can be polled from another
/// thread. The version only moves when the frame content changed.
#[derive(Clone)]
pub struct SharedScene {
    latest: Arc<RwLock<Latest>>,
}

impl SharedScene {
    pub fn new() -> Self {
        SharedScene {
            latest: Arc::new(RwLock::new(Latest {
                version: 0,
                content: String::new(),
                body: "null".to_string(),
            })),
        }
    }

    pub fn get_current_version(&self) -> u64 {
        self.latest.read().unwrap().version
    }

    pub fn version_string(version: u64) -> String {
        format!("\"{version:x}\"")
    }

    pub fn parse_version_string(version_str: &str) -> Option<u64> {
        let cleaned = version_str.trim_matches('"');
        u64::from_str_radix(cleaned, 16).ok()
    }

    /// `None` when the client already has the current version.
    pub fn get_latest_if_changed(&self, client_version: Option<&str>) -> Option<(String, String)> {
        let latest = self.latest.read().unwrap();
        match client_version {
            Some(v_str) if Self::parse_version_string(v_str) == Some(latest.version) => None,
            _ => Some((Self::version_string(latest.version), latest.body.clone())),
        }
    }
}

impl ViewPresenter for SharedScene {
    fn present(&mut self, viewport: &ViewportState, scene: &Scene) {
        let content = match serde_json::to_string(&(viewport, scene)) {
            Ok(content) => content,
            Err(e) => {
                error!("failed to serialize scene: {e}");
                return;
            }
        };
        let mut latest = self.latest.write().unwrap();
        if latest.content == content {
            return;
        }
        let version = latest.version.wrapping_add(1);
        let frame = Frame {
            version: Self::version_string(version),
            viewport,
            scene,
        };
        match serde_json::to_string(&frame) {
            Ok(body) => {
                latest.version = version;
                latest.content = content;
                latest.body = body;
            }
            Err(e) => error!("failed to serialize scene: {e}"),
        }
    }
}
