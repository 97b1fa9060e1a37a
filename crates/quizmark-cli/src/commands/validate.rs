//! The `quizmark validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(suite_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let suite = super::load_suite(&suite_path, config_path.as_deref())?;

    println!(
        "Suite: {} ({} tests)",
        suite_path.display(),
        suite.tests().len()
    );
    for (i, test) in suite.tests().iter().enumerate() {
        println!(
            "  Test {i}: {} questions, {} answers",
            test.question_count(),
            test.answer_count_total()
        );
    }

    let warnings = suite.warnings();
    for w in warnings {
        println!("  WARNING: {w}");
    }

    if warnings.is_empty() {
        println!("Suite valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
