//! `intestacy resolve`: evaluate a facts file without prompting.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use intestacy_core::{DistributionCalculator, EstateFacts};
use tracing::info;

use super::render_result;

pub fn run(calculator: &DistributionCalculator, path: &Path, json: bool) -> Result<()> {
    println!("{}", resolve_file(calculator, path, json)?);
    Ok(())
}

pub(crate) fn resolve_file(
    calculator: &DistributionCalculator,
    path: &Path,
    json: bool,
) -> Result<String> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let facts = EstateFacts::from_json(&content)
        .with_context(|| format!("parsing facts from {}", path.display()))?;
    info!(path = %path.display(), known = facts.known().count(), "resolving facts file");
    let result = calculator
        .resolve(&facts)
        .with_context(|| format!("resolving {}", path.display()))?;
    render_result(&result, json)
}
