//! Session notifications and the presentation seam.
//!
//! A [`Suite`](crate::suite::Suite) reports state changes through six
//! listener slots, one listener per kind, last registration wins. Rendering
//! is delegated to an optional [`Presenter`]; the engine runs headless with
//! [`NoopPresenter`].

use crate::answer::Answer;
use crate::marker::Marker;
use crate::question::{Question, Verdict};
use crate::test::Test;

pub type AnswerListener = Box<dyn FnMut(&Answer, Option<&Marker>) + Send>;
pub type QuestionListener = Box<dyn FnMut(&Question, Option<&Marker>) + Send>;
pub type MarkerListener = Box<dyn FnMut(&Marker) + Send>;
pub type TestListener = Box<dyn FnMut(&Test) + Send>;

/// The six listener slots of a suite.
#[derive(Default)]
pub struct Listeners {
    correct: Option<AnswerListener>,
    incorrect: Option<AnswerListener>,
    clicked: Option<AnswerListener>,
    advance: Option<QuestionListener>,
    marker_changed: Option<MarkerListener>,
    finished: Option<TestListener>,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("correct", &self.correct.is_some())
            .field("incorrect", &self.incorrect.is_some())
            .field("clicked", &self.clicked.is_some())
            .field("advance", &self.advance.is_some())
            .field("marker_changed", &self.marker_changed.is_some())
            .field("finished", &self.finished.is_some())
            .finish()
    }
}

impl Listeners {
    pub fn set_correct(&mut self, listener: AnswerListener) {
        self.correct = Some(listener);
    }

    pub fn set_incorrect(&mut self, listener: AnswerListener) {
        self.incorrect = Some(listener);
    }

    pub fn set_clicked(&mut self, listener: AnswerListener) {
        self.clicked = Some(listener);
    }

    pub fn set_advance(&mut self, listener: QuestionListener) {
        self.advance = Some(listener);
    }

    pub fn set_marker_changed(&mut self, listener: MarkerListener) {
        self.marker_changed = Some(listener);
    }

    pub fn set_finished(&mut self, listener: TestListener) {
        self.finished = Some(listener);
    }

    pub(crate) fn verdict(&mut self, verdict: Verdict, answer: &Answer, marker: Option<&Marker>) {
        let slot = match verdict {
            Verdict::Correct => &mut self.correct,
            Verdict::Incorrect => &mut self.incorrect,
        };
        if let Some(listener) = slot {
            listener(answer, marker);
        }
    }

    pub(crate) fn clicked(&mut self, answer: &Answer, marker: Option<&Marker>) {
        if let Some(listener) = &mut self.clicked {
            listener(answer, marker);
        }
    }

    pub(crate) fn advance(&mut self, question: &Question, marker: Option<&Marker>) {
        if let Some(listener) = &mut self.advance {
            listener(question, marker);
        }
    }

    pub(crate) fn marker_changed(&mut self, marker: &Marker) {
        if let Some(listener) = &mut self.marker_changed {
            listener(marker);
        }
    }

    pub(crate) fn finished(&mut self, test: &Test) {
        if let Some(listener) = &mut self.finished {
            listener(test);
        }
    }
}

/// Rendering hooks implemented by a presentation layer.
///
/// Every method has a no-op default so implementors only override what
/// they draw.
pub trait Presenter: Send {
    /// Resolve a container reference, clearing it first when `clear` is set.
    /// Returning `false` detaches the reference from the entity.
    fn prepare_container(&mut self, _reference: &str, _clear: bool) -> bool {
        true
    }

    /// A test was (re)built by a parse.
    fn render_test(&mut self, _test: &Test) {}

    /// An answer was evaluated.
    fn render_answer(&mut self, _answer: &Answer, _verdict: Verdict) {}

    /// A marker was recomputed.
    fn render_marker(&mut self, _marker: &Marker) {}
}

/// Presenter that draws nothing.
#[derive(Debug, Default)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {}
