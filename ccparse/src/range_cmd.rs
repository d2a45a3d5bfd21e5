use anyhow::{Context, Result};
use ccparse_core::{CiscoRange, Logger};

use crate::cli::{OutputFormat, RangeAction, RangeArgs};

pub fn run_range(args: RangeArgs) -> Result<()> {
    let joined = args.exprs.join(",");
    let range = CiscoRange::parse_with_logger(&joined, Logger::new("ccparse::range"))
        .with_context(|| format!("invalid range expression '{joined}'"))?;

    let items = match args.action {
        RangeAction::Expand => range.expanded(),
        RangeAction::Compress => range.compressed().to_vec(),
    };
    match args.format {
        OutputFormat::Text => println!("{}", items.join(",")),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
    }
    Ok(())
}
