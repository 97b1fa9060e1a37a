//! A single selectable option of a question.

use serde_json::{Map, Value};

use crate::config::{merge, unwrap_tag};
use crate::error::{QuizError, Result};
use crate::id::{child_id, Ordinal};
use crate::model::AnswerConf;

static ORDINAL: Ordinal = Ordinal::new();

#[derive(Debug, Clone)]
pub struct Answer {
    id: String,
    ordinal: u64,
    pub(crate) position: usize,
    conf: AnswerConf,
    checked: bool,
    valid: bool,
}

impl Answer {
    pub fn new(parent_id: &str, conf: AnswerConf) -> Self {
        Self {
            id: child_id(parent_id),
            ordinal: ORDINAL.next(),
            position: 0,
            conf,
            checked: false,
            valid: true,
        }
    }

    /// Parse an answer entry (`{ name, charset, txt }`, optionally wrapped
    /// as `{ "answer": { ... } }`), inheriting `defaults` from its question.
    pub fn from_value(value: &Value, parent_id: &str, defaults: Map<String, Value>) -> Result<Self> {
        let Value::Object(raw) = unwrap_tag(value, "answer") else {
            return Err(QuizError::MalformedPayload(
                "answer entry is not an object".into(),
            ));
        };
        let conf = AnswerConf::filter(merge(defaults, raw))?;
        Ok(Self::new(parent_id, conf))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// Index inside the owning question's answer list.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn name(&self) -> Option<&str> {
        self.conf.name.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.conf.txt
    }

    pub fn charset(&self) -> &str {
        &self.conf.charset
    }

    pub fn conf(&self) -> &AnswerConf {
        &self.conf
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// `false` once the answer has been disposed.
    pub fn is_live(&self) -> bool {
        self.valid
    }

    /// Mark the answer as selected. Returns `true` only for the first
    /// selection of a live answer.
    pub(crate) fn check(&mut self) -> bool {
        if !self.valid || self.checked {
            return false;
        }
        self.checked = true;
        true
    }

    /// Take the answer out of the live graph.
    pub fn dispose(&mut self) {
        self.valid = false;
    }

    pub(crate) fn same_key(&self, other: &Answer) -> bool {
        matches!((self.name(), other.name()), (Some(a), Some(b)) if a == b)
    }

    pub fn to_payload(&self) -> AnswerConf {
        self.conf.clone()
    }
}
