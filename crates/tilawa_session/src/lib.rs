//! Host-facing layer of the timeline editor: one locked editing session per
//! open project, exposed as plain command functions that take string ids and
//! seconds and answer with JSON.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod state;

pub use config::EditorConfig;
pub use error::CommandError;
pub use state::{AppState, EditSession};
