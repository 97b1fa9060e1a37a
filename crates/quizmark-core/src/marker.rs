//! Test scoring.
//!
//! A marker turns the attempt state of a test's questions into tallies and a
//! score on a nominal 0–10 scale:
//!
//! score = 10 × (true × 1/nQ − false × 1/((nA − 1) × nQ))
//!
//! Each wrong attempt costs the expected gain of a random guess among the
//! remaining `nA − 1` options. Blank and null tallies carry no weight.

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};
use crate::format::Rounding;
use crate::id::{child_id, Ordinal};
use crate::model::TestConf;
use crate::question::Question;

/// Maximum score.
pub const POINTS_TOP: f64 = 10.0;

/// Weight of one solved question before normalisation by `nQ`.
pub const SUCCESS_WEIGHT: f64 = 1.0;

static ORDINAL: Ordinal = Ordinal::new();

/// Tallies over a test's questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    /// Solved questions.
    #[serde(rename = "true")]
    pub true_count: u32,
    /// Wrong attempts, summed over all attempted questions.
    #[serde(rename = "false")]
    pub false_count: u32,
    /// Never incremented by the current scoring rules.
    #[serde(rename = "null")]
    pub null_count: u32,
    /// Questions never attempted.
    #[serde(rename = "blank")]
    pub blank_count: u32,
}

/// Marker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConf {
    pub rounding: Rounding,
    /// Question count of the owning test.
    pub question_count: usize,
    /// Answer count of the question that triggered the last update, or the
    /// test's total when the update had no trigger.
    pub answer_count: usize,
    pub charset: String,
}

impl MarkerConf {
    fn from_test(conf: &TestConf) -> Self {
        Self {
            rounding: conf.rounding(),
            question_count: conf.question_count,
            answer_count: conf.answer_count_total,
            charset: conf.charset.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Marker {
    id: String,
    ordinal: u64,
    test_id: String,
    results: Results,
    intents: u32,
    score: f64,
    conf: MarkerConf,
}

impl Marker {
    pub fn new(test_id: &str, conf: &TestConf) -> Self {
        Self {
            id: child_id(test_id),
            ordinal: ORDINAL.next(),
            test_id: test_id.to_string(),
            results: Results::default(),
            intents: 0,
            score: 0.0,
            conf: MarkerConf::from_test(conf),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// Id of the test this marker scores.
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn results(&self) -> Results {
        self.results
    }

    /// Total of all tallies incremented by the last recompute.
    pub fn intents(&self) -> u32 {
        self.intents
    }

    pub fn conf(&self) -> &MarkerConf {
        &self.conf
    }

    /// Score as of the last recompute.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Score rendered with the configured digits and precision.
    pub fn score_text(&self) -> String {
        self.conf.rounding.render(self.score)
    }

    /// Rebuild the tallies from the current question states.
    pub fn recompute(
        &mut self,
        test_conf: &TestConf,
        questions: &[Question],
        trigger: Option<&Question>,
    ) {
        self.results = Results::default();
        self.intents = 0;

        for q in questions.iter().filter(|q| q.is_live()) {
            if q.is_solved() {
                self.results.true_count += 1;
                self.intents += 1;
            }
            if q.is_marked() {
                let wrong = q.wrong_attempts();
                self.results.false_count += wrong;
                self.intents += wrong;
            } else {
                self.results.blank_count += 1;
                self.intents += 1;
            }
        }

        self.conf.question_count = test_conf.question_count;
        self.conf.answer_count =
            trigger.map_or(test_conf.answer_count_total, Question::answer_count);
        self.score = self.compute_score();

        tracing::debug!(
            marker = %self.id,
            true_count = self.results.true_count,
            false_count = self.results.false_count,
            blank_count = self.results.blank_count,
            score = self.score,
            "marker recomputed"
        );
    }

    /// `1 / nQ`.
    pub fn coefficient_successes(&self) -> Result<f64> {
        if self.conf.question_count == 0 {
            return Err(self.division_undefined());
        }
        Ok(SUCCESS_WEIGHT / self.conf.question_count as f64)
    }

    /// `1 / ((nA - 1) * nQ)`.
    pub fn coefficient_failures(&self) -> Result<f64> {
        if self.conf.question_count == 0 || self.conf.answer_count <= 1 {
            return Err(self.division_undefined());
        }
        Ok(1.0 / ((self.conf.answer_count - 1) * self.conf.question_count) as f64)
    }

    pub fn score_from_successes(&self) -> f64 {
        let coefficient = self.guarded(self.coefficient_successes());
        self.conf
            .rounding
            .round(self.results.true_count as f64 * coefficient)
    }

    pub fn score_from_failures(&self) -> f64 {
        let coefficient = self.guarded(self.coefficient_failures());
        self.conf
            .rounding
            .round(self.results.false_count as f64 * coefficient)
    }

    /// `10 * (successes - failures)`, rounded to the configured precision.
    pub fn compute_score(&self) -> f64 {
        self.conf
            .rounding
            .round(POINTS_TOP * (self.score_from_successes() - self.score_from_failures()))
    }

    fn guarded(&self, coefficient: Result<f64>) -> f64 {
        coefficient.unwrap_or_else(|e| {
            tracing::warn!(marker = %self.id, "{e}; contribution treated as zero");
            0.0
        })
    }

    fn division_undefined(&self) -> QuizError {
        QuizError::DivisionUndefined {
            question_count: self.conf.question_count,
            answer_count: self.conf.answer_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerConf, QuestionConf};

    fn question(num: i64, answers: usize, solution: usize, stop_on_success: bool) -> Question {
        let mut q = Question::new(
            "t",
            QuestionConf {
                num: Some(num),
                solution,
                stop_on_success: Some(stop_on_success),
                ..Default::default()
            },
        );
        for i in 0..answers {
            q.create_answer(AnswerConf {
                name: Some(format!("{}", (b'A' + i as u8) as char)),
                ..Default::default()
            });
        }
        q
    }

    fn test_conf(questions: &[Question]) -> TestConf {
        TestConf {
            question_count: questions.len(),
            answer_count_total: questions.iter().map(Question::answer_count).sum(),
            ..Default::default()
        }
    }

    #[test]
    fn worked_example_scores_seven_and_a_half() {
        let mut questions = vec![question(1, 3, 2, true), question(2, 3, 1, true)];
        questions[0].select(1).unwrap();
        questions[1].select(1).unwrap();
        questions[1].select(0).unwrap();

        let conf = test_conf(&questions);
        let mut marker = Marker::new("t", &conf);
        marker.recompute(&conf, &questions, Some(&questions[1]));

        let results = marker.results();
        assert_eq!(results.true_count, 2);
        assert_eq!(results.false_count, 1);
        assert_eq!(results.blank_count, 0);
        assert_eq!(marker.intents(), 3);
        assert_eq!(marker.coefficient_successes().unwrap(), 0.5);
        assert_eq!(marker.coefficient_failures().unwrap(), 0.25);
        assert_eq!(marker.score_from_successes(), 1.0);
        assert_eq!(marker.score_from_failures(), 0.25);
        assert_eq!(marker.compute_score(), 7.5);
        assert_eq!(marker.score(), 7.5);
        assert_eq!(marker.score_text(), "7.50");
    }

    #[test]
    fn huge_digits_and_precision_render_bounded_text() {
        let mut questions = vec![question(1, 3, 2, false)];
        questions[0].select(1).unwrap();
        let conf = TestConf {
            digits: usize::MAX,
            precision: usize::MAX,
            ..test_conf(&questions)
        };
        let mut marker = Marker::new("t", &conf);
        marker.recompute(&conf, &questions, None);
        assert_eq!(marker.score(), 10.0);
        let text = marker.score_text();
        assert_eq!(text.len(), crate::format::MAX_DIGITS + 1);
        assert!(text.ends_with("10.000000000000000"));
    }

    #[test]
    fn all_correct_scores_top() {
        let mut questions: Vec<_> = (1..=3).map(|n| question(n, 4, 3, false)).collect();
        for q in &mut questions {
            q.select(2).unwrap();
        }
        let conf = test_conf(&questions);
        let mut marker = Marker::new("t", &conf);
        marker.recompute(&conf, &questions, None);
        assert!((marker.score() - POINTS_TOP).abs() < 0.01);
    }

    #[test]
    fn untouched_questions_are_blank() {
        let questions = vec![question(1, 3, 1, false), question(2, 3, 1, false)];
        let conf = test_conf(&questions);
        let mut marker = Marker::new("t", &conf);
        marker.recompute(&conf, &questions, None);
        assert_eq!(marker.results().blank_count, 2);
        assert_eq!(marker.results().null_count, 0);
        assert_eq!(marker.score(), 0.0);
        assert_eq!(marker.conf().answer_count, 6);
    }

    #[test]
    fn failures_can_go_negative() {
        let mut questions = vec![question(1, 2, 1, false)];
        questions[0].select(1).unwrap();
        let conf = test_conf(&questions);
        let mut marker = Marker::new("t", &conf);
        marker.recompute(&conf, &questions, Some(&questions[0]));
        assert_eq!(marker.results().false_count, 1);
        assert_eq!(marker.score(), -10.0);
    }

    #[test]
    fn trigger_sets_answer_count() {
        let mut questions = vec![question(1, 2, 1, false), question(2, 5, 1, false)];
        questions[1].select(0).unwrap();
        let conf = test_conf(&questions);
        let mut marker = Marker::new("t", &conf);
        marker.recompute(&conf, &questions, Some(&questions[1]));
        assert_eq!(marker.conf().answer_count, 5);
        marker.recompute(&conf, &questions, None);
        assert_eq!(marker.conf().answer_count, 7);
    }

    #[test]
    fn zero_denominators_are_guarded() {
        let conf = TestConf {
            question_count: 0,
            answer_count_total: 0,
            ..Default::default()
        };
        let mut marker = Marker::new("t", &conf);
        marker.recompute(&conf, &[], None);
        assert!(matches!(
            marker.coefficient_successes(),
            Err(QuizError::DivisionUndefined { .. })
        ));
        assert!(marker.coefficient_failures().is_err());
        assert_eq!(marker.compute_score(), 0.0);
    }

    #[test]
    fn single_answer_question_has_no_failure_coefficient() {
        let mut questions = vec![question(1, 1, 2, false)];
        questions[0].select(0).unwrap();
        let conf = test_conf(&questions);
        let mut marker = Marker::new("t", &conf);
        marker.recompute(&conf, &questions, Some(&questions[0]));
        assert!(marker.coefficient_failures().is_err());
        assert_eq!(marker.coefficient_successes().unwrap(), 1.0);
        assert_eq!(marker.score(), 0.0);
    }
}
