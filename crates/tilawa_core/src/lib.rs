pub mod arrange;
pub mod coords;
pub mod editing;
pub mod error;
pub mod history;
pub mod playback;
pub mod snapping;
pub mod snapshot;
pub mod span;
pub mod types;

pub use error::{CoreError, Result};
pub use span::TimeSpan;
pub use types::{Clip, ClipKind, Marker, TimeUs, Timeline, Track};
