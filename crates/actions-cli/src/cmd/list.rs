use crate::output::{print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let rt = super::runtime()?;
    let presenter = super::load_presenter(&rt, root)?;
    let actions = presenter.snapshot().actions;

    if json {
        return print_json(&actions);
    }

    if actions.is_empty() {
        println!("No custom actions.");
        return Ok(());
    }

    let rows = actions
        .iter()
        .map(|a| {
            vec![
                a.emoji_char.clone().filter(|_| a.emoji).unwrap_or_default(),
                a.title.clone(),
                a.url.clone(),
                a.keys.as_ref().map(|k| k.join("+")).unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["ICON", "TITLE", "URL", "KEYS"], rows);
    Ok(())
}
