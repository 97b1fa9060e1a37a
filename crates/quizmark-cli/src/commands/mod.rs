pub mod export;
pub mod init;
pub mod play;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use quizmark_core::Suite;

use crate::config::load_config_from;

/// Read and parse a suite file, applying the configured test defaults.
pub(crate) fn load_suite(path: &Path, config_path: Option<&Path>) -> Result<Suite> {
    let config = load_config_from(config_path)?;
    let extra = config.extra_conf()?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read suite: {}", path.display()))?;

    let mut suite = Suite::new();
    suite
        .parse_all_str(&text, Some(&extra))
        .with_context(|| format!("failed to parse suite: {}", path.display()))?;
    Ok(suite)
}
