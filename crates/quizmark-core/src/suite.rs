//! The session root: parse/serialize entry points, selection dispatch and
//! listener registration.

use serde_json::{Map, Value};

use crate::answer::Answer;
use crate::error::{ParseWarning, QuizError, Result};
use crate::events::{Listeners, NoopPresenter, Presenter};
use crate::id::generate_id;
use crate::marker::Marker;
use crate::model::SuitePayload;
use crate::question::Question;
use crate::test::{SelectOutcome, Test};

/// An independent quiz session holding one or more tests.
pub struct Suite {
    id: String,
    tests: Vec<Test>,
    warnings: Vec<ParseWarning>,
    listeners: Listeners,
    presenter: Box<dyn Presenter>,
}

impl Default for Suite {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("id", &self.id)
            .field("tests", &self.tests)
            .field("warnings", &self.warnings)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl Suite {
    pub fn new() -> Self {
        Self {
            id: generate_id(),
            tests: Vec::new(),
            warnings: Vec::new(),
            listeners: Listeners::default(),
            presenter: Box::new(NoopPresenter),
        }
    }

    /// Attach a presentation layer.
    pub fn with_presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    pub fn test(&self, index: usize) -> Option<&Test> {
        self.tests.get(index)
    }

    /// Warnings collected by the last successful parse.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }

    pub fn on_correct(&mut self, f: impl FnMut(&Answer, Option<&Marker>) + Send + 'static) {
        self.listeners.set_correct(Box::new(f));
    }

    pub fn on_incorrect(&mut self, f: impl FnMut(&Answer, Option<&Marker>) + Send + 'static) {
        self.listeners.set_incorrect(Box::new(f));
    }

    pub fn on_click(&mut self, f: impl FnMut(&Answer, Option<&Marker>) + Send + 'static) {
        self.listeners.set_clicked(Box::new(f));
    }

    pub fn on_advance(&mut self, f: impl FnMut(&Question, Option<&Marker>) + Send + 'static) {
        self.listeners.set_advance(Box::new(f));
    }

    pub fn on_marker_changed(&mut self, f: impl FnMut(&Marker) + Send + 'static) {
        self.listeners.set_marker_changed(Box::new(f));
    }

    pub fn on_finished(&mut self, f: impl FnMut(&Test) + Send + 'static) {
        self.listeners.set_finished(Box::new(f));
    }

    /// Replace all tests with those described by `payload`.
    ///
    /// `payload` is `{ "tests": [...] }` or a bare array of test entries.
    /// `extra` is merged over every test's conf. On error the previously
    /// held tests are left as they were.
    pub fn parse_all(&mut self, payload: &Value, extra: Option<&Map<String, Value>>) -> Result<&[Test]> {
        let entries = match payload {
            Value::Null => return Err(QuizError::MalformedPayload("payload is null".into())),
            Value::Array(entries) => entries,
            Value::Object(root) => match root.get("tests") {
                Some(Value::Array(entries)) => entries,
                Some(_) => {
                    return Err(QuizError::MalformedPayload(
                        "`tests` is not an array".into(),
                    ))
                }
                None => return Err(QuizError::MalformedPayload("`tests` is missing".into())),
            },
            _ => {
                return Err(QuizError::MalformedPayload(
                    "payload is not an object".into(),
                ))
            }
        };
        if entries.is_empty() {
            return Err(QuizError::MalformedPayload("`tests` is empty".into()));
        }

        let has_extra = extra.is_some_and(|e| !e.is_empty());
        let mut tests = Vec::with_capacity(entries.len());
        let mut warnings = Vec::new();

        for (i, entry) in entries.iter().enumerate() {
            let path = format!("tests[{i}]");
            let has_conf = entry.get("conf").is_some_and(|c| !c.is_null());
            if entry.is_null() || (!has_conf && !has_extra) {
                tracing::warn!("skipping {path}: missing test or `conf`");
                warnings.push(ParseWarning::new(path, "missing test or `conf`, skipped"));
                continue;
            }
            let (test, nested) = Test::from_value(entry, extra).map_err(|e| {
                tracing::warn!("parse aborted at {path}: {e}");
                e
            })?;
            warnings.extend(nested.into_iter().map(|w| w.within(&path)));
            tests.push(test);
        }

        for test in &mut tests {
            self.prepare_containers(test);
            self.presenter.render_test(test);
        }

        tracing::info!(
            suite = %self.id,
            tests = tests.len(),
            warnings = warnings.len(),
            "suite parsed"
        );
        self.tests = tests;
        self.warnings = warnings;
        Ok(&self.tests)
    }

    /// [`Suite::parse_all`] from JSON text.
    pub fn parse_all_str(&mut self, text: &str, extra: Option<&Map<String, Value>>) -> Result<&[Test]> {
        let payload: Value = serde_json::from_str(text)?;
        self.parse_all(&payload, extra)
    }

    /// [`Suite::parse_all`] from an already typed payload.
    pub fn parse_payload(
        &mut self,
        payload: &SuitePayload,
        extra: Option<&Map<String, Value>>,
    ) -> Result<&[Test]> {
        let value = serde_json::to_value(payload)?;
        self.parse_all(&value, extra)
    }

    /// The whole session in payload form.
    pub fn to_payload(&self) -> SuitePayload {
        SuitePayload {
            tests: self.tests.iter().map(Test::to_payload).collect(),
        }
    }

    /// The whole session as a JSON value.
    pub fn serialize_all(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.to_payload())?)
    }

    /// The whole session as pretty-printed JSON text.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_payload())?)
    }

    /// Append a test built elsewhere.
    pub fn add_test(&mut self, mut test: Test) -> usize {
        self.prepare_containers(&mut test);
        self.presenter.render_test(&test);
        self.tests.push(test);
        self.tests.len() - 1
    }

    /// Remove the test at `index`.
    pub fn remove_test(&mut self, index: usize) -> Option<Test> {
        (index < self.tests.len()).then(|| self.tests.remove(index))
    }

    /// Drop every test.
    pub fn reset(&mut self) {
        self.tests.clear();
        self.warnings.clear();
    }

    /// Select an answer by positions and dispatch the resulting events.
    ///
    /// Returns `Ok(None)` when the selection was ignored by the attempt rules.
    pub fn select(
        &mut self,
        test: usize,
        question: usize,
        answer: usize,
    ) -> Result<Option<SelectOutcome>> {
        let target = self
            .tests
            .get_mut(test)
            .ok_or_else(|| QuizError::not_found("test", test))?;
        let Some(outcome) = target.select(question, answer)? else {
            return Ok(None);
        };

        let test = &self.tests[test];
        let question = &test.questions()[question];
        let answer = &question.answers()[answer];
        let marker = test.marker();

        self.presenter.render_answer(answer, outcome.verdict);
        if let Some(marker) = marker {
            self.presenter.render_marker(marker);
            self.listeners.marker_changed(marker);
        }
        if outcome.finished {
            tracing::info!(test = %test.id(), "test finished");
            self.listeners.finished(test);
        }
        if outcome.advance {
            self.listeners.advance(question, marker);
        }
        self.listeners.verdict(outcome.verdict, answer, marker);
        self.listeners.clicked(answer, marker);

        Ok(Some(outcome))
    }

    /// Select an answer by declared question `num` and answer `name`.
    pub fn select_by_name(
        &mut self,
        test: usize,
        question_num: i64,
        answer_name: &str,
    ) -> Result<Option<SelectOutcome>> {
        let target = self
            .tests
            .get(test)
            .ok_or_else(|| QuizError::not_found("test", test))?;
        let question = target
            .question_position(question_num)
            .ok_or_else(|| QuizError::not_found("question num", question_num))?;
        let answer = target.questions()[question]
            .answer_position(answer_name)
            .ok_or_else(|| QuizError::not_found("answer name", answer_name))?;
        self.select(test, question, answer)
    }

    /// Rescore a test without a selection and dispatch the marker events.
    pub fn refresh(&mut self, test: usize) -> Result<&Marker> {
        let target = self
            .tests
            .get_mut(test)
            .ok_or_else(|| QuizError::not_found("test", test))?;
        let finished = target.update_marker(None);

        let test = &self.tests[test];
        let Some(marker) = test.marker() else {
            return Err(QuizError::not_found("marker", test.id()));
        };
        self.presenter.render_marker(marker);
        self.listeners.marker_changed(marker);
        if finished {
            self.listeners.finished(test);
        }
        Ok(marker)
    }

    fn prepare_containers(&mut self, test: &mut Test) {
        let conf = test.conf();
        let (remove, marker_remove) = (conf.remove, conf.marker_remove);
        if let Some(reference) = conf.container.clone() {
            if !self.presenter.prepare_container(&reference, remove) {
                tracing::warn!(test = %test.id(), %reference, "container not found");
                test.detach_container();
            }
        }
        if let Some(reference) = test.conf().marker_container.clone() {
            if !self.presenter.prepare_container(&reference, marker_remove) {
                tracing::warn!(test = %test.id(), %reference, "marker container not found");
                test.detach_marker_container();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::Verdict;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn two_question_payload() -> Value {
        json!({
            "tests": [{
                "conf": { "nQ": 2, "nA": 6, "digits": 2, "precision": 2, "stopOnSuccess": true, "charset": "utf-8" },
                "questions": [
                    {
                        "conf": { "num": 1, "nA": 3, "solution": 2, "charset": "utf-8", "txt": "First" },
                        "answers": [
                            { "name": "A", "charset": "utf-8", "txt": "a" },
                            { "name": "B", "charset": "utf-8", "txt": "b" },
                            { "name": "C", "charset": "utf-8", "txt": "c" }
                        ]
                    },
                    {
                        "conf": { "num": 2, "nA": 3, "solution": 1, "charset": "utf-8", "txt": "Second" },
                        "answers": [
                            { "name": "A", "charset": "utf-8", "txt": "a" },
                            { "name": "B", "charset": "utf-8", "txt": "b" },
                            { "name": "C", "charset": "utf-8", "txt": "c" }
                        ]
                    }
                ]
            }]
        })
    }

    #[test]
    fn rejects_malformed_payloads() {
        let mut suite = Suite::new();
        for bad in [json!(null), json!({}), json!({ "tests": [] }), json!(42), json!({ "tests": {} })] {
            assert!(
                matches!(suite.parse_all(&bad, None), Err(QuizError::MalformedPayload(_))),
                "{bad}"
            );
        }
        assert!(matches!(suite.parse_all_str("{ nope", None), Err(QuizError::Json(_))));
    }

    #[test]
    fn failed_parse_keeps_previous_tests() {
        let mut suite = Suite::new();
        suite.parse_all(&two_question_payload(), None).unwrap();
        let before = suite.tests()[0].id().to_string();

        let err = suite
            .parse_all(&json!({ "tests": [ { "conf": {} } ] }), None)
            .unwrap_err();
        assert!(matches!(err, QuizError::MissingQuestions));
        assert_eq!(suite.tests()[0].id(), before);
    }

    #[test]
    fn reparse_replaces_tests() {
        let mut suite = Suite::new();
        suite.parse_all(&two_question_payload(), None).unwrap();
        let first = suite.tests()[0].id().to_string();
        let tests = suite.parse_all(&two_question_payload(), None).unwrap();
        assert_eq!(tests.len(), 1);
        assert_ne!(tests[0].id(), first);
    }

    #[test]
    fn entries_without_conf_are_skipped_unless_extra() {
        let payload = json!([ null, { "questions": [] }, { "conf": {}, "questions": [] } ]);
        let mut suite = Suite::new();
        assert_eq!(suite.parse_all(&payload, None).unwrap().len(), 1);
        assert_eq!(suite.warnings().len(), 2);

        let mut extra = Map::new();
        extra.insert("stopOnSuccess".into(), json!(true));
        let tests = suite.parse_all(&payload, Some(&extra)).unwrap();
        assert_eq!(tests.len(), 2);
        assert!(tests.iter().all(|t| t.conf().stop_on_success));
    }

    #[test]
    fn worked_example_through_events() {
        let mut suite = Suite::new();
        suite.parse_all(&two_question_payload(), None).unwrap();

        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let l = Arc::clone(&log);
        suite.on_correct(move |a, _| l.lock().unwrap().push(format!("ok {}", a.name().unwrap())));
        let l = Arc::clone(&log);
        suite.on_incorrect(move |a, _| l.lock().unwrap().push(format!("fail {}", a.name().unwrap())));
        let l = Arc::clone(&log);
        suite.on_click(move |_, _| l.lock().unwrap().push("click".into()));
        let l = Arc::clone(&log);
        suite.on_advance(move |q, _| l.lock().unwrap().push(format!("next {}", q.num().unwrap())));
        let l = Arc::clone(&log);
        suite.on_marker_changed(move |m| l.lock().unwrap().push(format!("score {}", m.score_text())));
        let l = Arc::clone(&log);
        suite.on_finished(move |_| l.lock().unwrap().push("finished".into()));

        suite.select_by_name(0, 1, "B").unwrap();
        suite.select_by_name(0, 2, "B").unwrap();
        let outcome = suite.select_by_name(0, 2, "A").unwrap().unwrap();
        assert_eq!(outcome.verdict, Verdict::Correct);
        assert!(outcome.finished);

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                "score 5.00", "next 1", "ok B", "click",
                "score 2.50", "fail B", "click",
                "score 7.50", "finished", "next 2", "ok A", "click",
            ]
        );

        let marker = suite.tests()[0].marker().unwrap();
        assert_eq!(marker.results().true_count, 2);
        assert_eq!(marker.results().false_count, 1);
        assert_eq!(marker.score(), 7.5);
    }

    #[test]
    fn ignored_selection_fires_nothing() {
        let mut payload = two_question_payload();
        payload["tests"][0]["conf"]["stopOnSuccess"] = json!(false);
        let mut suite = Suite::new();
        suite.parse_all(&payload, None).unwrap();

        let clicks = Arc::new(Mutex::new(0));
        let c = Arc::clone(&clicks);
        suite.on_click(move |_, _| *c.lock().unwrap() += 1);

        assert!(suite.select(0, 0, 0).unwrap().is_some());
        assert!(suite.select(0, 0, 1).unwrap().is_none());
        assert_eq!(*clicks.lock().unwrap(), 1);

        let q = &suite.tests()[0].questions()[0];
        assert_eq!(q.intents(), 1);
        assert!(!q.is_solved());
        assert!(q.is_marked());
    }

    #[test]
    fn structural_roundtrip() {
        let mut suite = Suite::new();
        suite.parse_all(&two_question_payload(), None).unwrap();
        let first = suite.to_payload();

        let mut again = Suite::new();
        again.parse_payload(&first, None).unwrap();
        assert_eq!(again.to_payload(), first);

        let text = suite.to_json_string().unwrap();
        again.parse_all_str(&text, None).unwrap();
        let test = &again.tests()[0];
        assert_eq!(test.question_count(), 2);
        assert_eq!(test.answer_count_total(), 6);
        assert_eq!(test.questions()[0].solution(), 2);
        assert_eq!(test.questions()[1].solution(), 1);
    }

    #[test]
    fn exported_questions_follow_new_test_stop_on_success() {
        let mut payload = two_question_payload();
        payload["tests"][0]["conf"]["stopOnSuccess"] = json!(false);
        let mut suite = Suite::new();
        suite.parse_all(&payload, None).unwrap();
        let exported = suite.serialize_all().unwrap();
        assert!(exported["tests"][0]["questions"][0]["conf"]
            .get("stopOnSuccess")
            .is_none());

        let mut extra = Map::new();
        extra.insert("stopOnSuccess".into(), json!(true));
        let mut again = Suite::new();
        again.parse_all(&exported, Some(&extra)).unwrap();
        let test = &again.tests()[0];
        assert!(test.conf().stop_on_success);
        assert!(test.questions().iter().all(Question::stop_on_success));

        again.select(0, 0, 0).unwrap();
        assert!(again.select(0, 0, 1).unwrap().is_some());
    }

    #[test]
    fn serialize_all_has_payload_shape() {
        let mut suite = Suite::new();
        suite.parse_all(&two_question_payload(), None).unwrap();
        let value = suite.serialize_all().unwrap();
        assert_eq!(value["tests"][0]["conf"]["nQ"], 2);
        assert_eq!(value["tests"][0]["questions"][1]["conf"]["solution"], 1);
        assert_eq!(value["tests"][0]["questions"][1]["answers"][2]["name"], "C");
    }

    #[test]
    fn refresh_creates_marker() {
        let mut suite = Suite::new();
        suite.parse_all(&two_question_payload(), None).unwrap();
        let marker = suite.refresh(0).unwrap();
        assert_eq!(marker.results().blank_count, 2);
        assert_eq!(marker.score_text(), "0.00");
        assert!(suite.refresh(3).is_err());
    }

    #[test]
    fn add_and_remove_tests() {
        let mut suite = Suite::new();
        let index = suite.add_test(Test::new(Default::default()));
        assert_eq!(index, 0);
        assert!(suite.remove_test(1).is_none());
        assert!(suite.remove_test(0).is_some());
        assert!(suite.tests().is_empty());
        suite.parse_all(&two_question_payload(), None).unwrap();
        suite.reset();
        assert!(suite.tests().is_empty());
    }

    struct RejectingPresenter;

    impl Presenter for RejectingPresenter {
        fn prepare_container(&mut self, reference: &str, _clear: bool) -> bool {
            reference != "missing"
        }
    }

    #[test]
    fn unresolved_containers_are_detached() {
        let mut payload = two_question_payload();
        payload["tests"][0]["conf"]["container"] = json!("missing");
        payload["tests"][0]["conf"]["markerContainer"] = json!("score");
        let mut suite = Suite::new().with_presenter(RejectingPresenter);
        let tests = suite.parse_all(&payload, None).unwrap();
        assert!(tests[0].conf().container.is_none());
        assert_eq!(tests[0].conf().marker_container.as_deref(), Some("score"));
    }
}
