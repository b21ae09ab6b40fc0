//! Terminal front-end: configuration, logging, rendering and the command loop.
mod app;
mod config;
mod logging;
mod render;

pub use app::run_app;
