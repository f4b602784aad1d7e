use super::{ActionBackend, StorageResult};
use crate::action::Action;
use crate::{io, paths};
use std::path::{Path, PathBuf};

/// Collection stored as a YAML list in `.actions/actions.yaml`.
pub struct YamlBackend {
    path: PathBuf,
}

impl YamlBackend {
    pub fn new(root: &Path) -> Self {
        Self {
            path: paths::actions_yaml_path(root),
        }
    }

    /// Use an explicit file instead of the project layout.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActionBackend for YamlBackend {
    fn name(&self) -> &str {
        "yaml"
    }

    fn read_all(&self) -> StorageResult<Vec<Action>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn write_all(&self, actions: &[Action]) -> StorageResult<()> {
        let content = serde_yaml::to_string(actions)?;
        io::atomic_write(&self.path, content.as_bytes())?;
        Ok(())
    }
}
