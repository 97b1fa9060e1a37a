//! The `quizmark play` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizmark_core::{SessionReport, Suite};

use crate::config::load_config_from;
use crate::OutputFormat;

/// One `TEST:NUM:NAME` selection.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    test: usize,
    question_num: i64,
    answer_name: String,
}

fn parse_selection(raw: &str) -> Result<Selection> {
    let parts: Vec<&str> = raw.trim().splitn(3, ':').collect();
    anyhow::ensure!(
        parts.len() == 3 && !parts[2].is_empty(),
        "invalid selection '{raw}', expected TEST:NUM:NAME"
    );
    let test = parts[0]
        .parse::<usize>()
        .map_err(|_| anyhow::anyhow!("invalid test index in selection '{raw}'"))?;
    let question_num = parts[1]
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("invalid question num in selection '{raw}'"))?;
    Ok(Selection {
        test,
        question_num,
        answer_name: parts[2].to_string(),
    })
}

/// Print session events to stderr as they fire.
fn attach_console_listeners(suite: &mut Suite) {
    suite.on_correct(|answer, _| {
        eprintln!("  correct: {}", answer.name().unwrap_or("?"));
    });
    suite.on_incorrect(|answer, _| {
        eprintln!("  incorrect: {}", answer.name().unwrap_or("?"));
    });
    suite.on_advance(|question, _| {
        if let Some(num) = question.num() {
            eprintln!("  question {num} done");
        }
    });
    suite.on_marker_changed(|marker| {
        eprintln!("  score: {}", marker.score_text());
    });
    suite.on_finished(|test| {
        eprintln!("  test {} finished", test.id());
    });
}

pub fn execute(
    suite_path: PathBuf,
    selections: Vec<String>,
    format: OutputFormat,
    output: Option<PathBuf>,
    save: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let selections = selections
        .iter()
        .map(|s| parse_selection(s))
        .collect::<Result<Vec<_>>>()?;

    let mut suite = super::load_suite(&suite_path, config_path.as_deref())?;
    attach_console_listeners(&mut suite);

    for (i, sel) in selections.iter().enumerate() {
        eprintln!(
            "select #{i}: test {} question {} answer {}",
            sel.test, sel.question_num, sel.answer_name
        );
        let outcome = suite
            .select_by_name(sel.test, sel.question_num, &sel.answer_name)
            .with_context(|| {
                format!(
                    "selection {}:{}:{} failed",
                    sel.test, sel.question_num, sel.answer_name
                )
            })?;
        if outcome.is_none() {
            eprintln!("  ignored");
        }
    }

    let report = SessionReport::from_suite(&suite);

    match format {
        OutputFormat::Markdown => println!("{}", report.to_markdown()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_summary(&report),
    }

    if let Some(path) = &output {
        report.save_json(path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    if save {
        let config = load_config_from(config_path.as_deref())?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = config.output_dir.join(format!("session-{timestamp}.json"));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(report: &SessionReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Test", "Questions", "Correct", "Wrong", "Blank", "Score", "Finished",
    ]);

    for t in &report.tests {
        table.add_row(vec![
            Cell::new(t.index),
            Cell::new(t.question_count),
            Cell::new(t.results.true_count),
            Cell::new(t.results.false_count),
            Cell::new(t.results.blank_count),
            Cell::new(&t.score_text),
            Cell::new(if t.finished { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
}
