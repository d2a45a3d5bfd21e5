use anyhow::{bail, Result};
use ccparse::device::Device;
use ccparse::report::{facts_json, prune_nulls, render_facts_text};
use ccparse_core::ResultMode;

use crate::cli::{FactsArgs, OutputFormat};
use crate::source::{load_dialect, load_document};

pub fn run_facts(args: FactsArgs) -> Result<()> {
    let result_mode = if args.complete {
        ResultMode::Complete
    } else {
        ResultMode::Minimal
    };
    let dialect = load_dialect(&args.input)?;
    let doc = load_document(&args.input, result_mode)?;
    if doc.is_empty() {
        bail!(
            "no configuration found in {} (use --no-trim for files without version/end markers)",
            args.input.file.display()
        );
    }
    let device = Device::new(doc, &dialect);

    if let Some(name) = &args.interface {
        let Some(interface) = device.interface(name) else {
            bail!("interface '{name}' not found");
        };
        let mut value = serde_json::to_value(interface)?;
        if result_mode == ResultMode::Minimal {
            prune_nulls(&mut value);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let facts = device.facts();
    match args.format {
        OutputFormat::Text => println!("{}", render_facts_text(&facts)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&facts_json(&facts)?)?),
    }
    Ok(())
}
