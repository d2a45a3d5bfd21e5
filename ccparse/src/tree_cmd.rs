use anyhow::{bail, Context, Result};
use ccparse::report::render_tree;
use ccparse_core::{Pattern, ResultMode};

use crate::cli::TreeArgs;
use crate::source::load_document;

pub fn run_tree(args: TreeArgs) -> Result<()> {
    let doc = load_document(&args.input, ResultMode::Minimal)?;

    if args.parents.is_empty() {
        println!("{}", render_tree(doc.lines()));
        return Ok(());
    }

    let parents = args
        .parents
        .iter()
        .map(|regex| Pattern::new(regex).with_context(|| format!("invalid --parent regex '{regex}'")))
        .collect::<Result<Vec<_>>>()?;
    let parents: Vec<&Pattern> = parents.iter().collect();
    let section = doc.section_by_parents(&parents);
    if section.is_empty() {
        bail!("no unique section matches parents {:?}", args.parents);
    }
    println!("{}", render_tree(section));
    Ok(())
}
