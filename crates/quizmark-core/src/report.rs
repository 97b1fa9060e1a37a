//! Session report types with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::marker::Results;
use crate::question::{Question, QuestionState};
use crate::suite::Suite;
use crate::test::Test;

/// Snapshot of a quiz session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Id of the suite the report was taken from.
    pub suite_id: String,
    /// One summary per test, in suite order.
    pub tests: Vec<TestSummary>,
}

/// Scoring state of a single test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSummary {
    pub index: usize,
    pub test_id: String,
    pub question_count: usize,
    pub answer_count: usize,
    pub results: Results,
    pub intents: u32,
    pub score: f64,
    /// Score padded and rounded per the test's configuration.
    pub score_text: String,
    pub finished: bool,
    pub questions: Vec<QuestionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub num: Option<i64>,
    pub text: String,
    pub state: QuestionState,
    pub intents: u32,
}

impl QuestionSummary {
    fn from_question(question: &Question) -> Self {
        Self {
            num: question.num(),
            text: question.text().to_string(),
            state: question.state(),
            intents: question.intents(),
        }
    }
}

impl TestSummary {
    fn from_test(index: usize, test: &Test) -> Self {
        let (results, intents, score, score_text) = match test.marker() {
            Some(m) => (m.results(), m.intents(), m.score(), m.score_text()),
            None => {
                let rounding = test.conf().rounding();
                let blank = test.questions().iter().filter(|q| q.is_live()).count();
                let results = Results {
                    blank_count: u32::try_from(blank).unwrap_or(u32::MAX),
                    ..Results::default()
                };
                (results, 0, 0.0, rounding.render(0.0))
            }
        };
        Self {
            index,
            test_id: test.id().to_string(),
            question_count: test.question_count(),
            answer_count: test.answer_count_total(),
            results,
            intents,
            score,
            score_text,
            finished: test.is_finished(),
            questions: test
                .questions()
                .iter()
                .filter(|q| q.is_live())
                .map(QuestionSummary::from_question)
                .collect(),
        }
    }
}

impl SessionReport {
    /// Capture the current state of every test in `suite`.
    pub fn from_suite(suite: &Suite) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            suite_id: suite.id().to_string(),
            tests: suite
                .tests()
                .iter()
                .enumerate()
                .map(|(i, t)| TestSummary::from_test(i, t))
                .collect(),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Quiz Session Report\n\n");
        md.push_str(&format!(
            "**Suite:** `{}`  \n**Created:** {}\n\n",
            self.suite_id,
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        md.push_str("| Test | Questions | Correct | Wrong | Blank | Score | Finished |\n");
        md.push_str("|------|-----------|---------|-------|-------|-------|----------|\n");
        for t in &self.tests {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                t.index,
                t.question_count,
                t.results.true_count,
                t.results.false_count,
                t.results.blank_count,
                t.score_text,
                if t.finished { "yes" } else { "no" }
            ));
        }

        for t in &self.tests {
            if t.questions.is_empty() {
                continue;
            }
            md.push_str(&format!("\n### Test {}\n\n", t.index));
            md.push_str("| # | Question | State | Attempts |\n");
            md.push_str("|---|----------|-------|----------|\n");
            for q in &t.questions {
                let num = q.num.map_or_else(|| "-".to_string(), |n| n.to_string());
                let state = match q.state {
                    QuestionState::Unattempted => "unattempted",
                    QuestionState::AttemptedIncorrect => "incorrect",
                    QuestionState::Solved => "solved",
                };
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    num,
                    q.text.replace('|', "\\|"),
                    state,
                    q.intents
                ));
            }
        }

        md
    }

    /// Sum of scores over all tests.
    pub fn total_score(&self) -> f64 {
        self.tests.iter().map(|t| t.score).sum()
    }
}
