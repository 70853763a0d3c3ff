//! Error types shared by the catalog loader, the store and the dispatcher.

use thiserror::Error;

use crate::world::ValidationError;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Save file error: {0}")]
    SaveFormat(#[from] serde_json::Error),

    #[error("World file error: {0}")]
    WorldFormat(#[from] toml::de::Error),

    #[error("Invalid world: {0}")]
    InvalidWorld(String),

    #[error("World failed validation: {}", join_validation(.0))]
    Validation(Vec<ValidationError>),

    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Unknown mob: {0}")]
    UnknownMob(String),

    #[error("Unknown tool: {0}")]
    UnknownCommand(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Unsupported save version {found} (expected {expected})")]
    UnsupportedSaveVersion { found: u32, expected: u32 },
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, GameError>;
