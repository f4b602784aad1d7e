//! Collection storage in a redb key-value database.
//!
//! # Table design
//!
//! A single `COLLECTIONS` table maps a collection name to the JSON-encoded
//! list of actions. Custom actions live under [`CUSTOM_ACTIONS_KEY`]; each
//! write replaces that value inside one write transaction, so a reader never
//! observes a half-written collection.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use super::{ActionBackend, StorageError, StorageResult};
use crate::action::Action;

// ---------------------------------------------------------------------------
// Table definition
// ---------------------------------------------------------------------------

/// Key: collection name. Value: JSON-encoded `Vec<Action>`.
const COLLECTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("collections");

pub const CUSTOM_ACTIONS_KEY: &str = "custom_actions";

fn db_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Db(e.to_string())
}

// ---------------------------------------------------------------------------
// RedbBackend
// ---------------------------------------------------------------------------

pub struct RedbBackend {
    db: Database,
}

impl RedbBackend {
    /// Open or create the database at `path`.
    ///
    /// Creates the `COLLECTIONS` table if it doesn't already exist.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(COLLECTIONS).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }
}

impl ActionBackend for RedbBackend {
    fn name(&self) -> &str {
        "redb"
    }

    fn read_all(&self) -> StorageResult<Vec<Action>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(COLLECTIONS).map_err(db_err)?;
        match table.get(CUSTOM_ACTIONS_KEY).map_err(db_err)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(Vec::new()),
        }
    }

    fn write_all(&self, actions: &[Action]) -> StorageResult<()> {
        let value = serde_json::to_vec(actions)?;
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(COLLECTIONS).map_err(db_err)?;
            table
                .insert(CUSTOM_ACTIONS_KEY, value.as_slice())
                .map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, RedbBackend) {
        let dir = TempDir::new().unwrap();
        let backend = RedbBackend::open(&dir.path().join(".actions/actions.redb")).unwrap();
        (dir, backend)
    }

    #[test]
    fn fresh_database_reads_empty() {
        let (_dir, backend) = open_temp();
        assert!(backend.read_all().unwrap().is_empty());
    }

    #[test]
    fn write_replaces_whole_collection() {
        let (_dir, backend) = open_temp();
        backend
            .write_all(&[Action::new("A", "https://a"), Action::new("B", "https://b")])
            .unwrap();
        backend.write_all(&[Action::new("C", "https://c")]).unwrap();

        let stored = backend.read_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "C");
    }

    #[test]
    fn survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("actions.redb");
        {
            let backend = RedbBackend::open(&path).unwrap();
            backend
                .write_all(&[Action::new("MDN", "https://developer.mozilla.org/").with_emoji("✨")])
                .unwrap();
        }
        let backend = RedbBackend::open(&path).unwrap();
        let stored = backend.read_all().unwrap();
        assert_eq!(stored[0].emoji_char.as_deref(), Some("✨"));
    }
}
