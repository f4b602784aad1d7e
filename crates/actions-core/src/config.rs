use crate::error::{ActionError, Result};
use crate::paths;
use crate::presenter::DEFAULT_HEADING;
use crate::storage::{ActionBackend, RedbBackend, YamlBackend};
use crate::store::ActionStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CURRENT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Yaml,
    Redb,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Yaml => f.write_str("yaml"),
            BackendKind::Redb => f.write_str("redb"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Override for the data file, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_path(&self, root: &Path) -> PathBuf {
        match (&self.path, self.backend) {
            (Some(p), _) => root.join(p),
            (None, BackendKind::Yaml) => paths::actions_yaml_path(root),
            (None, BackendKind::Redb) => paths::actions_db_path(root),
        }
    }
}

// ---------------------------------------------------------------------------
// ViewConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_heading")]
    pub heading: String,
}

fn default_heading() -> String {
    DEFAULT_HEADING.to_string()
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            heading: default_heading(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            storage: StorageConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl Config {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            storage: StorageConfig {
                backend,
                path: None,
            },
            ..Self::default()
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(ActionError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        Ok(())
    }

    /// Open the configured persistence backend.
    pub fn open_backend(&self, root: &Path) -> Result<Arc<dyn ActionBackend>> {
        let path = self.storage.resolved_path(root);
        let backend: Arc<dyn ActionBackend> = match self.storage.backend {
            BackendKind::Yaml => Arc::new(YamlBackend::at(path)),
            BackendKind::Redb => Arc::new(RedbBackend::open(&path)?),
        };
        tracing::debug!(backend = %self.storage.backend, "opened action storage");
        Ok(backend)
    }

    pub fn open_store(&self, root: &Path) -> Result<ActionStore> {
        Ok(ActionStore::new(self.open_backend(root)?))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version > CURRENT_VERSION {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "config version {} is newer than supported version {}",
                    self.version, CURRENT_VERSION
                ),
            });
        }

        if self.view.heading.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "view.heading is empty; the list will render without a title"
                    .to_string(),
            });
        }

        if let Some(path) = &self.storage.path {
            if path.is_absolute() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "storage.path '{}' is absolute; it will not move with the project",
                        path.display()
                    ),
                });
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            let expected: &[&str] = match self.storage.backend {
                BackendKind::Yaml => &["yaml", "yml"],
                BackendKind::Redb => &["redb", "db"],
            };
            if !expected.contains(&ext) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "storage.path '{}' does not look like a {} file",
                        path.display(),
                        self.storage.backend
                    ),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.storage.backend, BackendKind::Yaml);
        assert_eq!(parsed.view.heading, DEFAULT_HEADING);
        assert!(!yaml.contains("path"));
    }

    #[test]
    fn minimal_yaml_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("storage:\n  backend: redb\n").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.storage.backend, BackendKind::Redb);
        assert_eq!(cfg.view.heading, DEFAULT_HEADING);
    }

    #[test]
    fn load_without_init_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(ActionError::NotInitialized)
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new(BackendKind::Redb);
        cfg.view.heading = "Shortcuts".to_string();
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.storage.backend, BackendKind::Redb);
        assert_eq!(loaded.view.heading, "Shortcuts");
    }

    #[test]
    fn resolved_paths_follow_backend() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            Config::new(BackendKind::Yaml).storage.resolved_path(root),
            PathBuf::from("/tmp/proj/.actions/actions.yaml")
        );
        assert_eq!(
            Config::new(BackendKind::Redb).storage.resolved_path(root),
            PathBuf::from("/tmp/proj/.actions/actions.redb")
        );
        let custom = StorageConfig {
            backend: BackendKind::Yaml,
            path: Some(PathBuf::from("data/mine.yaml")),
        };
        assert_eq!(
            custom.resolved_path(root),
            PathBuf::from("/tmp/proj/data/mine.yaml")
        );
    }

    #[test]
    fn validate_default_has_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_problems() {
        let mut cfg = Config::new(BackendKind::Redb);
        cfg.version = 7;
        cfg.view.heading = "  ".to_string();
        cfg.storage.path = Some(PathBuf::from("actions.yaml"));
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("version 7")));
        assert!(warnings.iter().any(|w| w.message.contains("view.heading")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("does not look like a redb file")));
    }

    #[tokio::test]
    async fn open_store_for_each_backend() {
        for kind in [BackendKind::Yaml, BackendKind::Redb] {
            let dir = TempDir::new().unwrap();
            let store = Config::new(kind).open_store(dir.path()).unwrap();
            assert_eq!(store.backend_name(), kind.to_string());
            let actions = store
                .upsert(crate::action::Action::new("MDN", "https://developer.mozilla.org/"))
                .await
                .unwrap();
            assert_eq!(actions.len(), 1);
        }
    }
}
