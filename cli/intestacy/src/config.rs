//! `intestacy.toml` configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use intestacy_core::{DistributionCalculator, Money};
use intestacy_flow::FlowOptions;

pub const FILE_NAME: &str = "intestacy.toml";

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntestacyConfig {
    #[serde(default)]
    pub calculator: CalculatorConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalculatorConfig {
    /// Statutory legacy for a surviving spouse, e.g. `"322000.00"`.
    #[serde(default)]
    pub statutory_legacy: Option<Money>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    #[serde(default)]
    pub collect_counts: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"warn"` or `"intestacy_flow=debug"`.
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub json: bool,
}

impl IntestacyConfig {
    /// Search upward from `start_dir` for an `intestacy.toml` file, parse and
    /// return it along with the path it was found at.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(FILE_NAME);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let config: IntestacyConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((config, candidate)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a configuration from a TOML string.
    #[cfg(test)]
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing intestacy.toml")
    }

    pub fn calculator(&self) -> DistributionCalculator {
        self.calculator
            .statutory_legacy
            .map(DistributionCalculator::new)
            .unwrap_or_default()
    }

    pub fn flow_options(&self) -> FlowOptions {
        FlowOptions {
            collect_counts: self.flow.collect_counts,
        }
    }

    /// The file written by `intestacy init`.
    pub fn template() -> String {
        format!(
            r#"[calculator]
# Statutory legacy for a surviving spouse or civil partner.
statutory_legacy = "{}"

[flow]
# Ask how many people share before showing the result.
collect_counts = false

[logging]
# Overridden by RUST_LOG and --log-level.
filter = "warn"
json = false
"#,
            intestacy_core::STATUTORY_LEGACY.to_decimal_string()
        )
    }
}
