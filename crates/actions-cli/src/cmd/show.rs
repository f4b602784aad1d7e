use crate::output::print_json;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let rt = super::runtime()?;
    let presenter = super::load_presenter(&rt, root)?;
    let view = presenter.view();

    if json {
        print_json(&view)
    } else {
        print!("{}", view.root.to_text());
        Ok(())
    }
}
