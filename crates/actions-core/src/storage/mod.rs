//! Persistence collaborators for the committed collection.
//!
//! Every backend stores the whole collection and replaces it wholesale on
//! write; there are no per-entry deltas. Backends are synchronous and are
//! driven from tokio's blocking pool by [`crate::store::ActionStore`].

use crate::action::Action;
use thiserror::Error;

pub mod db;
pub mod memory;
pub mod yaml;

pub use db::RedbBackend;
pub use memory::MemoryBackend;
pub use yaml::YamlBackend;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Db(String),

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("storage task failed: {0}")]
    Join(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Whole-collection read/write over some key-value medium.
pub trait ActionBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Read the full persisted collection. A store that has never been
    /// written reads as empty.
    fn read_all(&self) -> StorageResult<Vec<Action>>;

    /// Replace the persisted collection with `actions`.
    fn write_all(&self, actions: &[Action]) -> StorageResult<()>;
}
