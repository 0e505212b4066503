use crate::types::ClipKind;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Track not found: {0}")]
    TrackNotFound(Uuid),

    #[error("Clip not found: {0}")]
    ClipNotFound(Uuid),

    #[error("Marker not found: {0}")]
    MarkerNotFound(Uuid),

    #[error("Kind mismatch: track accepts {expected:?}, got {found:?}")]
    KindMismatch { expected: ClipKind, found: ClipKind },

    #[error("Invalid span: {0}")]
    InvalidSpan(String),

    #[error("Track is locked: {0}")]
    TrackLocked(Uuid),

    #[error("Split point must lie strictly inside the clip")]
    SplitPointOutOfRange,

    #[error("At least two clips are required")]
    InsufficientClips,

    #[error("Clips are not adjacent")]
    NotAdjacent,

    #[error("Clips belong to different tracks")]
    MixedTracks,

    #[error("Duplicate clip id: {0}")]
    DuplicateClip(Uuid),

    #[error("Duplicate track id: {0}")]
    DuplicateTrack(Uuid),

    #[error("Invalid zoom factor: {0}")]
    InvalidZoom(f64),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Stable machine-readable code, used by hosts to pick a user message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TrackNotFound(_) => "TRACK_NOT_FOUND",
            Self::ClipNotFound(_) => "CLIP_NOT_FOUND",
            Self::MarkerNotFound(_) => "MARKER_NOT_FOUND",
            Self::KindMismatch { .. } => "KIND_MISMATCH",
            Self::InvalidSpan(_) => "INVALID_SPAN",
            Self::TrackLocked(_) => "TRACK_LOCKED",
            Self::SplitPointOutOfRange => "SPLIT_POINT_OUT_OF_RANGE",
            Self::InsufficientClips => "INSUFFICIENT_CLIPS",
            Self::NotAdjacent => "NOT_ADJACENT",
            Self::MixedTracks => "MIXED_TRACKS",
            Self::DuplicateClip(_) => "DUPLICATE_CLIP",
            Self::DuplicateTrack(_) => "DUPLICATE_TRACK",
            Self::InvalidZoom(_) => "INVALID_ZOOM",
            Self::InvalidOperation(_) => "INVALID_OPERATION",
            Self::InvalidSnapshot(_) => "INVALID_SNAPSHOT",
            Self::NothingToUndo => "NOTHING_TO_UNDO",
            Self::NothingToRedo => "NOTHING_TO_REDO",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
