use crate::draft::DraftState;
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("not initialized: run 'actions init'")]
    NotInitialized,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("draft session is closed ({0})")]
    DraftClosed(DraftState),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ActionError>;
