use std::collections::HashMap;
use tilawa_core::TimeUs;

/// Lookup of media durations by source handle.
///
/// The editor never opens media itself; whatever owns the assets answers
/// this.
pub trait MediaCatalog: Send + Sync {
    fn duration_of(&self, source_ref: &str) -> Option<TimeUs>;
}

/// In-memory catalog, filled by the host as assets are imported.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    durations: HashMap<String, TimeUs>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_ref: impl Into<String>, duration: TimeUs) {
        self.durations.insert(source_ref.into(), duration);
    }
}

impl MediaCatalog for StaticCatalog {
    fn duration_of(&self, source_ref: &str) -> Option<TimeUs> {
        self.durations.get(source_ref).copied()
    }
}
