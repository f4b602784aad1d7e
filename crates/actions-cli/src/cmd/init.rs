use actions_core::config::{BackendKind, Config};
use actions_core::{io, paths};
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, backend: &str) -> anyhow::Result<()> {
    let kind = parse_backend(backend)?;

    println!("Initializing custom actions in: {}", root.display());

    let dir = paths::actions_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config = if paths::config_path(root).exists() {
        println!("  exists:  .actions/config.yaml");
        Config::load(root).context("failed to read config.yaml")?
    } else {
        let cfg = Config::new(kind);
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: .actions/config.yaml");
        cfg
    };

    let data_path = config.storage.resolved_path(root);
    let created = match config.storage.backend {
        BackendKind::Yaml => io::write_if_missing(&data_path, b"[]\n")
            .with_context(|| format!("failed to write {}", data_path.display()))?,
        BackendKind::Redb => {
            let existed = data_path.exists();
            config
                .open_backend(root)
                .context("failed to create action database")?;
            !existed
        }
    };
    let shown = data_path
        .strip_prefix(root)
        .unwrap_or(&data_path)
        .display()
        .to_string();
    if created {
        println!("  created: {shown}");
    } else {
        println!("  exists:  {shown}");
    }

    Ok(())
}

fn parse_backend(s: &str) -> anyhow::Result<BackendKind> {
    match s {
        "yaml" => Ok(BackendKind::Yaml),
        "redb" => Ok(BackendKind::Redb),
        other => anyhow::bail!("unknown backend '{other}' (valid values: yaml, redb)"),
    }
}
