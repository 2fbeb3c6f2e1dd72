#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod config;
pub mod coordinate;
pub mod gpx_replay;
pub mod import_data;
pub mod logs;
pub mod position_source;
pub mod renderer;
pub mod session;
pub mod tracking;
pub mod trail;
pub mod utils;
pub mod viewport;
