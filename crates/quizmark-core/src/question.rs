//! Multiple-choice questions and their attempt state machine.
//!
//! A question starts unattempted. The first selection marks it; a correct
//! selection solves it. With `stopOnSuccess` set, wrong selections may be
//! followed by further attempts until the question is solved; otherwise the
//! first selection is final.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::answer::Answer;
use crate::config::{merge, unwrap_tag};
use crate::error::{ParseWarning, QuizError, Result};
use crate::id::{child_id, Ordinal};
use crate::model::{AnswerConf, QuestionConf, QuestionPayload};

static ORDINAL: Ordinal = Ordinal::new();

/// Outcome of evaluating a selected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// Where the attempt state machine currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionState {
    Unattempted,
    AttemptedIncorrect,
    Solved,
}

/// Result of inserting a child entity into its parent's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Appended at this position.
    Appended(usize),
    /// Replaced the entry with the same key at this position.
    Replaced(usize),
}

#[derive(Debug, Clone)]
pub struct Question {
    id: String,
    ordinal: u64,
    pub(crate) position: usize,
    conf: QuestionConf,
    answers: Vec<Answer>,
    ok: bool,
    marked: bool,
    intents: u32,
    valid: bool,
    inherited_stop_on_success: bool,
}

impl Question {
    pub fn new(parent_id: &str, conf: QuestionConf) -> Self {
        Self {
            id: child_id(parent_id),
            ordinal: ORDINAL.next(),
            position: 0,
            conf,
            answers: Vec::new(),
            ok: false,
            marked: false,
            intents: 0,
            valid: true,
            inherited_stop_on_success: false,
        }
    }

    /// Parse a question entry `{ conf, answers }` (optionally wrapped as
    /// `{ "question": { ... } }`), inheriting `defaults` from its test.
    ///
    /// Null or malformed answer entries are skipped and reported as
    /// warnings; a missing `answers` array fails the whole entry.
    pub fn from_value(
        value: &Value,
        parent_id: &str,
        defaults: Map<String, Value>,
    ) -> Result<(Self, Vec<ParseWarning>)> {
        let Value::Object(entry) = unwrap_tag(value, "question") else {
            return Err(QuizError::MalformedPayload(
                "question entry is not an object".into(),
            ));
        };

        let mut warnings = Vec::new();
        let own = match entry.get("conf") {
            Some(Value::Object(conf)) => conf.clone(),
            None | Some(Value::Null) => {
                warnings.push(ParseWarning::new("conf", "missing `conf`, using defaults"));
                Map::new()
            }
            Some(_) => {
                return Err(QuizError::MalformedPayload(
                    "question `conf` is not an object".into(),
                ))
            }
        };
        let conf = QuestionConf::filter(merge(defaults, &own))?;

        let answers = match entry.get("answers") {
            Some(Value::Array(answers)) => answers,
            None | Some(Value::Null) => return Err(QuizError::MissingAnswers),
            Some(_) => {
                return Err(QuizError::MalformedPayload(
                    "question `answers` is not an array".into(),
                ))
            }
        };

        let mut question = Question::new(parent_id, conf);
        for (i, raw) in answers.iter().enumerate() {
            let path = format!("answers[{i}]");
            if raw.is_null() {
                warnings.push(ParseWarning::new(path, "entry is null, skipped"));
                continue;
            }
            match Answer::from_value(raw, &question.id, question.conf.answer_defaults()) {
                Ok(answer) => {
                    if let Placement::Replaced(pos) = question.add_answer(answer) {
                        warnings.push(ParseWarning::new(
                            path,
                            format!("duplicate answer name replaced the answer at position {pos}"),
                        ));
                    }
                }
                Err(e) => {
                    tracing::warn!(question = %question.id, "skipping {path}: {e}");
                    warnings.push(ParseWarning::new(path, format!("skipped: {e}")));
                }
            }
        }
        question.update_answer_count();

        Ok((question, warnings))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// Index inside the owning test's question list.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Declared question number.
    pub fn num(&self) -> Option<i64> {
        self.conf.num
    }

    pub fn text(&self) -> &str {
        &self.conf.txt
    }

    pub fn conf(&self) -> &QuestionConf {
        &self.conf
    }

    /// 1-based index of the correct answer.
    pub fn solution(&self) -> usize {
        self.conf.solution
    }

    /// Whether retries are allowed: the question's own setting, or the
    /// owning test's when it has none.
    pub fn stop_on_success(&self) -> bool {
        self.conf
            .stop_on_success
            .unwrap_or(self.inherited_stop_on_success)
    }

    /// Set the test-level `stopOnSuccess` this question falls back to.
    pub fn inherit_stop_on_success(&mut self, stop_on_success: bool) {
        self.inherited_stop_on_success = stop_on_success;
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index)
    }

    pub fn answer_count(&self) -> usize {
        self.conf.answer_count
    }

    pub fn is_solved(&self) -> bool {
        self.ok
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Number of selections this question has accepted.
    pub fn intents(&self) -> u32 {
        self.intents
    }

    /// Accepted selections that were wrong.
    pub fn wrong_attempts(&self) -> u32 {
        if self.ok {
            self.intents.saturating_sub(1)
        } else {
            self.intents
        }
    }

    pub fn is_live(&self) -> bool {
        self.valid
    }

    pub fn state(&self) -> QuestionState {
        match (self.marked, self.ok) {
            (_, true) => QuestionState::Solved,
            (true, false) => QuestionState::AttemptedIncorrect,
            (false, false) => QuestionState::Unattempted,
        }
    }

    /// `true` iff the answer at `position` is the solution.
    pub fn verify(&self, position: usize) -> bool {
        position + 1 == self.conf.solution
    }

    /// Whether a further selection would be evaluated.
    pub fn accepts_selection(&self) -> bool {
        self.valid && (!self.marked || (self.stop_on_success() && !self.ok))
    }

    /// Select the answer at `answer_index`.
    ///
    /// Returns `Ok(None)` when the selection is ignored: the answer was
    /// already selected once, or the question no longer accepts attempts.
    pub fn select(&mut self, answer_index: usize) -> Result<Option<Verdict>> {
        let answer = self
            .answers
            .get_mut(answer_index)
            .ok_or_else(|| QuizError::not_found("answer", answer_index))?;
        if !answer.check() {
            return Ok(None);
        }
        let position = answer.position;

        if !self.accepts_selection() {
            tracing::debug!(question = %self.id, position, "selection ignored");
            return Ok(None);
        }

        self.intents += 1;
        let verdict = if self.verify(position) {
            self.ok = true;
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };
        self.marked = true;

        tracing::debug!(
            question = %self.id,
            position,
            intents = self.intents,
            ?verdict,
            "answer selected"
        );
        Ok(Some(verdict))
    }

    /// Drop disposed answers. Survivors keep their positions.
    pub fn sanitize_answers(&mut self) {
        self.answers.retain(Answer::is_live);
    }

    /// Insert an answer, replacing in place any answer with the same name.
    pub fn add_answer(&mut self, mut answer: Answer) -> Placement {
        self.sanitize_answers();
        let placement = match self.answers.iter().position(|a| a.same_key(&answer)) {
            Some(index) => {
                tracing::info!(
                    question = %self.id,
                    name = answer.name().unwrap_or_default(),
                    "replacing answer with duplicate name"
                );
                answer.position = self.answers[index].position;
                self.answers[index] = answer;
                Placement::Replaced(index)
            }
            None => {
                answer.position = self.answers.len();
                self.answers.push(answer);
                Placement::Appended(self.answers.len() - 1)
            }
        };
        self.update_answer_count();
        placement
    }

    pub fn create_answer(&mut self, conf: AnswerConf) -> Placement {
        let answer = Answer::new(&self.id, conf);
        self.add_answer(answer)
    }

    /// Remove and dispose the answer at `index`, renumbering the rest.
    pub fn remove_answer(&mut self, index: usize) -> Option<Answer> {
        if index >= self.answers.len() {
            return None;
        }
        let mut removed = self.answers.remove(index);
        removed.dispose();
        for (position, answer) in self.answers.iter_mut().enumerate() {
            answer.position = position;
        }
        self.update_answer_count();
        Some(removed)
    }

    /// Position of the answer with the given name.
    pub fn answer_position(&self, name: &str) -> Option<usize> {
        self.answers.iter().position(|a| a.name() == Some(name))
    }

    /// Take the question out of the live graph.
    pub fn dispose(&mut self) {
        for answer in &mut self.answers {
            answer.dispose();
        }
        self.answers.clear();
        self.valid = false;
    }

    pub(crate) fn same_key(&self, other: &Question) -> bool {
        matches!((self.num(), other.num()), (Some(a), Some(b)) if a == b)
    }

    fn update_answer_count(&mut self) {
        self.conf.answer_count = self.answers.len();
    }

    pub fn to_payload(&self) -> QuestionPayload {
        QuestionPayload {
            conf: self.conf.clone(),
            answers: self.answers.iter().map(Answer::to_payload).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(solution: usize, stop_on_success: bool) -> Question {
        let (q, warnings) = Question::from_value(
            &json!({
                "conf": { "num": 1, "solution": solution, "stopOnSuccess": stop_on_success },
                "answers": [
                    { "name": "A", "txt": "One" },
                    { "name": "B", "txt": "Three" },
                    { "name": "C", "txt": "Zero" }
                ]
            }),
            "t",
            Map::new(),
        )
        .unwrap();
        assert!(warnings.is_empty());
        q
    }

    #[test]
    fn verify_is_one_based() {
        let q = question(2, false);
        assert!(!q.verify(0));
        assert!(q.verify(1));
        assert!(!q.verify(2));
    }

    #[test]
    fn answer_count_follows_answers() {
        let q = question(1, false);
        assert_eq!(q.answer_count(), 3);
        assert_eq!(q.answers()[2].position(), 2);
    }

    #[test]
    fn correct_first_try_solves() {
        let mut q = question(2, false);
        assert_eq!(q.select(1).unwrap(), Some(Verdict::Correct));
        assert!(q.is_solved());
        assert!(q.is_marked());
        assert_eq!(q.intents(), 1);
        assert_eq!(q.wrong_attempts(), 0);
        assert_eq!(q.state(), QuestionState::Solved);
    }

    #[test]
    fn single_shot_ignores_second_attempt() {
        let mut q = question(2, false);
        assert_eq!(q.select(0).unwrap(), Some(Verdict::Incorrect));
        assert_eq!(q.select(1).unwrap(), None);
        assert!(!q.is_solved());
        assert_eq!(q.intents(), 1);
        assert_eq!(q.state(), QuestionState::AttemptedIncorrect);
    }

    #[test]
    fn retries_until_correct() {
        let mut q = question(1, true);
        assert_eq!(q.select(1).unwrap(), Some(Verdict::Incorrect));
        assert_eq!(q.select(2).unwrap(), Some(Verdict::Incorrect));
        assert_eq!(q.select(0).unwrap(), Some(Verdict::Correct));
        assert_eq!(q.intents(), 3);
        assert_eq!(q.wrong_attempts(), 2);
        assert!(!q.accepts_selection());
    }

    #[test]
    fn same_answer_counts_once() {
        let mut q = question(1, true);
        assert_eq!(q.select(1).unwrap(), Some(Verdict::Incorrect));
        assert_eq!(q.select(1).unwrap(), None);
        assert_eq!(q.intents(), 1);
    }

    #[test]
    fn unknown_answer_index_is_an_error() {
        let mut q = question(1, true);
        assert!(matches!(q.select(7), Err(QuizError::NotFound { .. })));
    }

    #[test]
    fn duplicate_name_replaces_in_place() {
        let mut q = question(1, false);
        let placement = q.create_answer(AnswerConf {
            name: Some("B".into()),
            txt: "Four".into(),
            ..Default::default()
        });
        assert_eq!(placement, Placement::Replaced(1));
        assert_eq!(q.answer_count(), 3);
        assert_eq!(q.answers()[1].text(), "Four");
        assert_eq!(q.answers()[1].position(), 1);
    }

    #[test]
    fn new_name_appends() {
        let mut q = question(1, false);
        let placement = q.create_answer(AnswerConf {
            name: Some("D".into()),
            ..Default::default()
        });
        assert_eq!(placement, Placement::Appended(3));
        assert_eq!(q.answer_count(), 4);
        assert_eq!(q.answer_position("D"), Some(3));
    }

    #[test]
    fn remove_answer_renumbers() {
        let mut q = question(1, false);
        let removed = q.remove_answer(0).unwrap();
        assert!(!removed.is_live());
        assert_eq!(q.answer_count(), 2);
        assert_eq!(q.answers()[0].name(), Some("B"));
        assert_eq!(q.answers()[0].position(), 0);
        assert!(q.remove_answer(5).is_none());
    }

    #[test]
    fn missing_answers_fails() {
        let err = Question::from_value(&json!({ "conf": { "num": 1 } }), "t", Map::new())
            .unwrap_err();
        assert!(matches!(err, QuizError::MissingAnswers));
    }

    #[test]
    fn bad_answer_entries_are_skipped() {
        let (q, warnings) = Question::from_value(
            &json!({
                "answers": [ { "name": "A" }, null, 42, { "name": "A", "txt": "again" } ]
            }),
            "t",
            Map::new(),
        )
        .unwrap();
        assert_eq!(q.answer_count(), 1);
        assert_eq!(q.answers()[0].text(), "again");
        let paths: Vec<_> = warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["conf", "answers[1]", "answers[2]", "answers[3]"]);
    }

    #[test]
    fn inherits_stop_on_success() {
        let (mut q, _) =
            Question::from_value(&json!({ "conf": {}, "answers": [] }), "t", Map::new()).unwrap();
        assert!(!q.stop_on_success());
        q.inherit_stop_on_success(true);
        assert!(q.stop_on_success());
        assert!(q.to_payload().conf.stop_on_success.is_none());

        let (mut q, _) = Question::from_value(
            &json!({ "conf": { "stopOnSuccess": false }, "answers": [] }),
            "t",
            Map::new(),
        )
        .unwrap();
        q.inherit_stop_on_success(true);
        assert!(!q.stop_on_success());
        assert_eq!(q.to_payload().conf.stop_on_success, Some(false));
    }

    #[test]
    fn inherited_retries_allow_second_attempt() {
        let (mut q, _) = Question::from_value(
            &json!({ "conf": { "solution": 2 }, "answers": [ { "name": "A" }, { "name": "B" } ] }),
            "t",
            Map::new(),
        )
        .unwrap();
        q.inherit_stop_on_success(true);
        assert_eq!(q.select(0).unwrap(), Some(Verdict::Incorrect));
        assert_eq!(q.select(1).unwrap(), Some(Verdict::Correct));
    }
}
