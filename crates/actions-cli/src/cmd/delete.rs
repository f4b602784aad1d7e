use crate::output::print_json;
use actions_core::action;
use std::path::Path;

pub fn run(root: &Path, url: &str, json: bool) -> anyhow::Result<()> {
    let rt = super::runtime()?;
    let presenter = super::load_presenter(&rt, root)?;

    let snapshot = presenter.snapshot();
    let Some(target) = action::find(&snapshot.actions, url).cloned() else {
        // Deleting an absent action is a no-op.
        if json {
            print_json(&serde_json::json!({ "url": url, "deleted": false }))?;
        } else {
            println!("No action with url '{url}'.");
        }
        return Ok(());
    };

    let remaining = rt.block_on(presenter.on_delete_intent(&target))?;

    if json {
        print_json(&serde_json::json!({
            "url": url,
            "deleted": true,
            "remaining": remaining.len(),
        }))?;
    } else {
        println!("Deleted action '{}'.", target.title);
    }
    Ok(())
}
