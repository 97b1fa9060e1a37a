//! Error and warning types for the quiz engine.
//!
//! Structural failures abort a parse and are reported as [`QuizError`].
//! Problems confined to a single question or answer entry are recorded as
//! [`ParseWarning`]s and the entry is skipped.

use thiserror::Error;

/// Errors raised by parsing, selection and scoring.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The top-level payload is missing, empty, or of the wrong shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A test entry has no `questions` array.
    #[error("test has no `questions` array")]
    MissingQuestions,

    /// A question entry has no `answers` array.
    #[error("question has no `answers` array")]
    MissingAnswers,

    /// A scoring coefficient has a zero denominator.
    #[error("scoring coefficient undefined (nQ = {question_count}, nA = {answer_count})")]
    DivisionUndefined {
        question_count: usize,
        answer_count: usize,
    },

    /// No entity exists at the requested index or key.
    #[error("no {kind} at {key}")]
    NotFound { kind: &'static str, key: String },

    /// Payload text is not valid JSON, or a value has the wrong type.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl QuizError {
    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        QuizError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Returns `true` if this error only affects one entry of an array and
    /// the surrounding parse may continue.
    pub fn is_entry_local(&self) -> bool {
        matches!(
            self,
            QuizError::MissingAnswers | QuizError::MalformedPayload(_) | QuizError::Json(_)
        )
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, QuizError>;

/// A non-fatal problem found while parsing a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Location inside the payload, e.g. `tests[0].questions[2]`.
    pub path: String,
    /// Warning message.
    pub message: String,
}

impl ParseWarning {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Prefix the path with the location of the enclosing entry.
    pub(crate) fn within(mut self, prefix: &str) -> Self {
        self.path = if self.path.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}.{}", self.path)
        };
        self
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "[{}] {}", self.path, self.message)
        }
    }
}
