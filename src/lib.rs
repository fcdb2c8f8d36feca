// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod display;
pub mod duration;
pub mod error;
pub mod input;
pub mod keyboard;
pub mod notify;
pub mod runtime;
pub mod session;
pub mod signals;
pub mod summary;
pub mod terminal;
pub mod timer;
