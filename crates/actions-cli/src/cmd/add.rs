use crate::output::print_json;
use std::path::Path;

pub fn run(root: &Path, raw_fields: &[String], json: bool) -> anyhow::Result<()> {
    let fields = super::parse_pairs(raw_fields)?;
    let rt = super::runtime()?;
    let presenter = super::load_presenter(&rt, root)?;

    let actions = rt.block_on(presenter.on_add_intent(fields))?;
    // Add always appends, so the new action is last in storage order.
    let Some(added) = actions.last() else {
        anyhow::bail!("store returned an empty collection after add");
    };

    if json {
        print_json(added)?;
    } else {
        println!("Added action '{}' ({}).", added.title, added.url);
    }
    Ok(())
}
