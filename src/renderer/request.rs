use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::tracking::Command;

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub request_id: String,
    #[serde(flatten)]
    pub command: Command,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    pub request_id: String,
    pub success: bool,
    pub error: Option<String>,
}

impl Request {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Hands the command over to the running session. The session applies
    /// it on its own turn, so success here only means it was queued.
    pub fn handle(self, commands: &UnboundedSender<Command>) -> RequestResponse {
        let Request {
            request_id,
            command,
        } = self;
        match commands.send(command) {
            Ok(()) => RequestResponse {
                request_id,
                success: true,
                error: None,
            },
            Err(_) => {
                warn!("request {request_id} dropped, session is gone");
                RequestResponse {
                    request_id,
                    success: false,
                    error: Some("tracking session has ended".to_string()),
                }
            }
        }
    }
}
