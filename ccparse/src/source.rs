use std::fs;

use anyhow::{Context, Result};
use ccparse::dialect::Dialect;
use ccparse_core::{ConfigDocument, Logger, Markers, ParseOptions, ResultMode};

use crate::cli::InputArgs;

/// Read and normalize the configuration named by `input`.
pub fn load_document(input: &InputArgs, result_mode: ResultMode) -> Result<ConfigDocument> {
    let text = fs::read_to_string(&input.file)
        .with_context(|| format!("failed to read {}", input.file.display()))?;
    let markers = if input.no_trim {
        None
    } else {
        Some(Markers::default())
    };
    let options = ParseOptions::default()
        .with_result_mode(result_mode)
        .with_markers(markers);
    Ok(ConfigDocument::parse(&text, &options, Logger::new("ccparse")))
}

pub fn load_dialect(input: &InputArgs) -> Result<Dialect> {
    let dialect = Dialect::load_or_default(input.dialect_file.as_deref())?;
    log::debug!(target: "ccparse", "using dialect '{}'", dialect.name());
    Ok(dialect)
}
