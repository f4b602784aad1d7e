pub mod add;
pub mod config;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod show;
pub mod ui;

use actions_core::config::Config;
use actions_core::{ActionListPresenter, FormFields};
use anyhow::Context;
use std::path::Path;
use tokio::runtime::Runtime;

/// Split repeated `name=value` arguments into ordered form fields.
pub fn parse_pairs(raw: &[String]) -> anyhow::Result<FormFields> {
    raw.iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .with_context(|| format!("expected NAME=VALUE, got '{pair}'"))?;
            let name = name.trim();
            if name.is_empty() {
                anyhow::bail!("field name missing in '{pair}'");
            }
            Ok((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Presenter over the project's configured store, with the committed list
/// already loaded.
pub fn load_presenter(rt: &Runtime, root: &Path) -> anyhow::Result<ActionListPresenter> {
    let config = Config::load(root)?;
    let store = config
        .open_store(root)
        .context("failed to open action storage")?;
    let presenter = ActionListPresenter::new(store).with_heading(config.view.heading);
    rt.block_on(presenter.load())
        .context("failed to load custom actions")?;
    Ok(presenter)
}

pub fn runtime() -> anyhow::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
