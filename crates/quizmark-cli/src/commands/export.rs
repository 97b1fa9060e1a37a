//! The `quizmark export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn execute(
    suite_path: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let suite = super::load_suite(&suite_path, config_path.as_deref())?;
    for w in suite.warnings() {
        eprintln!("WARNING: {w}");
    }

    let json = suite
        .to_json_string()
        .context("failed to serialize suite")?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write suite to {}", path.display()))?;
            eprintln!(
                "Exported {} test(s) to: {}",
                suite.tests().len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
