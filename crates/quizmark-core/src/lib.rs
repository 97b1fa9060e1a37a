//! quizmark-core: the quiz session engine, scoring and payload codec.
//!
//! A [`Suite`] owns tests, a [`Test`] owns questions and a [`Marker`], and a
//! [`Question`] owns answers. Payloads are plain JSON; see [`model`] for the
//! typed shapes and [`Suite::parse_all`] / [`Suite::serialize_all`] for the
//! entry points.

pub mod answer;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod id;
pub mod marker;
pub mod model;
pub mod question;
pub mod report;
pub mod suite;

pub use answer::Answer;
pub use error::{ParseWarning, QuizError, Result};
pub use events::{NoopPresenter, Presenter};
pub use marker::{Marker, Results};
pub use model::{AnswerConf, QuestionConf, SuitePayload, TestConf};
pub use question::{Question, QuestionState, Verdict};
pub use report::SessionReport;
pub use suite::Suite;
pub use test::{SelectOutcome, Test};
