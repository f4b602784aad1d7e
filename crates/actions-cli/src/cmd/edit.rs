use crate::output::print_json;
use std::path::Path;

pub fn run(root: &Path, url: &str, raw_fields: &[String], json: bool) -> anyhow::Result<()> {
    let fields = super::parse_pairs(raw_fields)?;
    let rt = super::runtime()?;
    let presenter = super::load_presenter(&rt, root)?;

    let mut draft = presenter.open_draft(url)?;
    draft.update_with(|action| action.apply_fields(fields))?;
    if !draft.is_dirty() {
        if json {
            print_json(draft.baseline())?;
        } else {
            println!("No changes to '{}'.", draft.baseline().title);
        }
        return Ok(());
    }

    let commit = rt.block_on(presenter.on_save_intent(&mut draft))?;

    if json {
        print_json(&commit.action)?;
    } else {
        println!("Saved action '{}' ({}).", commit.action.title, commit.action.url);
    }
    Ok(())
}
