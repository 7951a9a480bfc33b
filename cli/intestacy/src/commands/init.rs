//! `intestacy init`: write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::{IntestacyConfig, FILE_NAME};

pub fn run(dir: &Path) -> Result<()> {
    let path = write_config(dir)?;
    println!("Created {}", path.display());
    Ok(())
}

pub(crate) fn write_config(dir: &Path) -> Result<std::path::PathBuf> {
    let path = dir.join(FILE_NAME);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    fs::write(&path, IntestacyConfig::template())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
