//! CLI command implementations.

pub mod ask;
pub mod init;
pub mod questions;
pub mod resolve;

use anyhow::{Context, Result};
use intestacy_core::DistributionResult;

/// Text shown for a resolved distribution: the narrative and breakdown
/// table, or the whole result as JSON.
pub(crate) fn render_result(result: &DistributionResult, json: bool) -> Result<String> {
    if json {
        return result.to_json().context("serializing distribution");
    }
    Ok(format!(
        "Estate Distribution\n\n{}\n\n{}",
        result.narrative,
        result.format_table()
    ))
}
