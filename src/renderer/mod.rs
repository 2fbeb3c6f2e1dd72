pub mod scene;
pub use scene::{derive_scene, Scene};

pub mod presenter;
pub use presenter::{SharedScene, ViewPresenter};

pub mod request;

pub mod scene_server;
pub use scene_server::SceneServer;
