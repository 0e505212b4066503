use serde::ser::{SerializeStruct, Serializer};
use thiserror::Error;
use tilawa_core::CoreError;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Invalid id '{id}': {source}")]
    BadId { id: String, source: uuid::Error },

    #[error("Invalid argument: {0}")]
    BadArgument(String),

    #[error("No media found for '{0}'")]
    UnknownSource(String),

    #[error("Session state is poisoned")]
    Poisoned,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Core(e) => e.code(),
            Self::BadId { .. } => "BAD_ID",
            Self::BadArgument(_) => "BAD_ARGUMENT",
            Self::UnknownSource(_) => "UNKNOWN_SOURCE",
            Self::Poisoned => "SESSION_POISONED",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

impl serde::Serialize for CommandError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("CommandError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;
