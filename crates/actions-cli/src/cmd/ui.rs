use actions_core::config::Config;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, port: u16, no_open: bool) -> anyhow::Result<()> {
    // Fail fast before binding when the project is not initialized.
    Config::load(root)?;

    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let root_buf = root.to_path_buf();
    rt.block_on(async move { actions_server::serve(root_buf, port, !no_open).await })
}
