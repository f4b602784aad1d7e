use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const ACTIONS_DIR: &str = ".actions";

pub const CONFIG_FILE: &str = ".actions/config.yaml";
pub const ACTIONS_YAML_FILE: &str = ".actions/actions.yaml";
pub const ACTIONS_DB_FILE: &str = ".actions/actions.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn actions_dir(root: &Path) -> PathBuf {
    root.join(ACTIONS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn actions_yaml_path(root: &Path) -> PathBuf {
    root.join(ACTIONS_YAML_FILE)
}

pub fn actions_db_path(root: &Path) -> PathBuf {
    root.join(ACTIONS_DB_FILE)
}
