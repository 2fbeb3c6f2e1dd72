use actix_web::dev::{Service, ServerHandle};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::Result;
use std::thread;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::renderer::presenter::SharedScene;
use crate::renderer::request::Request;
use crate::tracking::Command;

struct AppState {
    scene: SharedScene,
    commands: UnboundedSender<Command>,
}

async fn serve_scene(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let client_version = req
        .headers()
        .get("If-None-Match")
        .and_then(|h| h.to_str().ok());
    match data.scene.get_latest_if_changed(client_version) {
        None => HttpResponse::NotModified().finish(),
        Some((version, body)) => HttpResponse::Ok()
            .insert_header(("ETag", version))
            .content_type("application/json")
            .body(body),
    }
}

async fn post_command(body: String, data: web::Data<AppState>) -> HttpResponse {
    match Request::parse(&body) {
        Ok(request) => HttpResponse::Ok().json(request.handle(&data.commands)),
        Err(e) => {
            warn!("bad command request: {e}");
            HttpResponse::BadRequest().body(e.to_string())
        }
    }
}

/// Serves the presented scene over HTTP for a web map and takes commands
/// back. Runs on its own thread with its own runtime, so it never shares a
/// thread with the tracking session.
pub struct SceneServer {
    host: String,
    port: u16,
    url: Option<String>,
    handle: Option<thread::JoinHandle<()>>,
    server_handle: Option<ServerHandle>,
    scene: SharedScene,
    commands: UnboundedSender<Command>,
}

impl SceneServer {
    pub fn new(
        host: &str,
        port: u16,
        scene: SharedScene,
        commands: UnboundedSender<Command>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            url: None,
            handle: None,
            server_handle: None,
            scene,
            commands,
        }
    }

    /// Base url, something like `http://localhost:1234/<random prefix>`.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    // Start the server in a separate thread
    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            bail!("scene server already started");
        }
        let host = self.host.clone();
        let port = self.port;
        let random_prefix = Uuid::new_v4().to_string();
        let app_state = web::Data::new(AppState {
            scene: self.scene.clone(),
            commands: self.commands.clone(),
        });

        let (tx, rx) = std::sync::mpsc::channel::<Result<(u16, ServerHandle)>>();

        let prefix = random_prefix.clone();
        let handle = thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = tx.send(Err(e.into()));
                    return;
                }
            };
            runtime.block_on(async move {
                info!("Setting up server routes...");
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(app_state.clone())
                        .wrap_fn(|req, srv| {
                            debug!("Incoming request: {} {}", req.method(), req.uri());
                            srv.call(req)
                        })
                        .route(&format!("/{prefix}/scene"), web::get().to(serve_scene))
                        .route(&format!("/{prefix}/command"), web::post().to(post_command))
                })
                .workers(1)
                .bind(format!("{host}:{port}"));
                let server = match server {
                    Ok(server) => server,
                    Err(e) => {
                        let _ = tx.send(Err(e.into()));
                        return;
                    }
                };

                // port 0 means the OS picked one
                let actual_port = server
                    .addrs()
                    .first()
                    .map(|addr| addr.port())
                    .unwrap_or(port);
                let server = server.run();
                let _ = tx.send(Ok((actual_port, server.handle())));

                info!("Server bound successfully to {host}:{actual_port}");
                if let Err(e) = server.await {
                    error!("scene server failed: {e}");
                }
            });
        });

        let (actual_port, server_handle) = rx
            .recv()
            .map_err(|_| anyhow!("scene server thread exited early"))??;
        self.url = Some(format!(
            "http://{}:{}/{}",
            self.host, actual_port, random_prefix
        ));
        self.handle = Some(handle);
        self.server_handle = Some(server_handle);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(server_handle) = self.server_handle.take() {
            pollster::block_on(server_handle.stop(true));
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("scene server thread panicked");
            }
        }
        self.url = None;
    }
}

impl Drop for SceneServer {
    fn drop(&mut self) {
        self.stop();
    }
}
