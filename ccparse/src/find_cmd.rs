use anyhow::{Context, Result};
use ccparse::report::{render_extracted, render_matches};
use ccparse_core::{Group, LineRef, Pattern, ResultMode};

use crate::cli::FindArgs;
use crate::source::load_document;

pub fn run_find(args: FindArgs) -> Result<()> {
    let doc = load_document(&args.input, ResultMode::Minimal)?;
    let pattern =
        Pattern::new(&args.regex).with_context(|| format!("invalid regex '{}'", args.regex))?;

    let parents: Vec<LineRef<'_>> = match &args.children_of {
        Some(regex) => {
            let parent = Pattern::new(regex)
                .with_context(|| format!("invalid --children-of regex '{regex}'"))?;
            doc.find_objects(&parent)
                .into_iter()
                .filter(|line| line.is_parent())
                .collect()
        }
        None => Vec::new(),
    };

    match &args.group {
        None => {
            let matches: Vec<LineRef<'_>> = if args.children_of.is_some() {
                parents
                    .iter()
                    .flat_map(|parent| parent.search_children(&pattern))
                    .collect()
            } else {
                doc.find_objects(&pattern)
            };
            println!("{}", render_matches(&matches));
        }
        Some(group) => {
            let group = parse_group(group);
            let values = if args.children_of.is_some() {
                parents
                    .iter()
                    .flat_map(|parent| parent.search_children_group(&pattern, group.clone()))
                    .collect::<Vec<_>>()
            } else {
                doc.find_objects(&pattern)
                    .into_iter()
                    .filter_map(|line| line.search_group(&pattern, group.clone()))
                    .collect()
            };
            println!("{}", render_extracted(&values));
        }
    }

    Ok(())
}

fn parse_group(raw: &str) -> Group {
    match raw.parse::<usize>() {
        Ok(index) => Group::Index(index),
        Err(_) => Group::from(raw),
    }
}
