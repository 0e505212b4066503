use crate::config::EditorConfig;
use crate::error::{CommandError, Result};
use crate::media::MediaCatalog;
use std::sync::{Mutex, MutexGuard};
use tilawa_core::history::History;
use tilawa_core::playback::PlaybackCursor;
use tilawa_core::Timeline;

/// Everything one open project edits, guarded together so every command
/// sees a consistent timeline, cursor and history.
#[derive(Debug)]
pub struct EditSession {
    pub timeline: Timeline,
    pub cursor: PlaybackCursor,
    pub history: History,
}

impl EditSession {
    pub fn new(history_size: usize) -> Self {
        Self {
            timeline: Timeline::new(),
            cursor: PlaybackCursor::new(),
            history: History::new(history_size),
        }
    }
}

pub struct AppState {
    pub session: Mutex<EditSession>,
    pub config: EditorConfig,
    pub catalog: Box<dyn MediaCatalog>,
}

impl AppState {
    pub fn new(config: EditorConfig, catalog: Box<dyn MediaCatalog>) -> Self {
        Self {
            session: Mutex::new(EditSession::new(config.history_size)),
            config,
            catalog,
        }
    }

    /// Open a previously saved timeline. History starts empty.
    pub fn with_timeline(
        config: EditorConfig,
        catalog: Box<dyn MediaCatalog>,
        timeline: Timeline,
    ) -> Self {
        let mut session = EditSession::new(config.history_size);
        session.timeline = timeline;
        Self {
            session: Mutex::new(session),
            config,
            catalog,
        }
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, EditSession>> {
        self.session.lock().map_err(|_| CommandError::Poisoned)
    }
}
