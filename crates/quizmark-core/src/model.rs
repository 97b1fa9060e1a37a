//! Configuration records and the declarative payload shape.
//!
//! The JSON keys follow the payload format (`nQ`, `nA`, `stopOnSuccess`, ...).
//! Keys the engine does not know about are kept in `extra` so a payload
//! survives a parse/serialize round-trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::strip_nulls;
use crate::error::Result;
use crate::format::Rounding;

const DEFAULT_CHARSET: &str = "utf-8";

/// Configuration of a [`Test`](crate::test::Test).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestConf {
    /// Presentation class name.
    pub class_name: String,
    /// Reference to the surface the test renders into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// Reference to the surface the marker renders into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_container: Option<String>,
    /// Clear the container before rendering.
    pub remove: bool,
    /// Clear the marker container before rendering.
    pub marker_remove: bool,
    /// Declared test number, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<i64>,
    /// Number of live questions (derived).
    #[serde(rename = "nQ")]
    pub question_count: usize,
    /// Sum of answer counts over live questions (derived).
    #[serde(rename = "nA")]
    pub answer_count_total: usize,
    /// Minimum digit count of a rendered score.
    pub digits: usize,
    /// Decimal places of a rendered score.
    pub precision: usize,
    /// Count the minus sign towards `digits`.
    pub sign: bool,
    /// Allow retries on a question until it is answered correctly.
    pub stop_on_success: bool,
    /// Character encoding tag for the test's texts.
    pub charset: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TestConf {
    fn default() -> Self {
        Self {
            class_name: String::new(),
            container: None,
            marker_container: None,
            remove: false,
            marker_remove: false,
            num: None,
            question_count: 1,
            answer_count_total: 4,
            digits: 2,
            precision: 2,
            sign: false,
            stop_on_success: false,
            charset: DEFAULT_CHARSET.to_string(),
            extra: Map::new(),
        }
    }
}

impl TestConf {
    /// Build a typed configuration from a merged raw object.
    pub fn filter(raw: Map<String, Value>) -> Result<Self> {
        let mut conf: TestConf = serde_json::from_value(Value::Object(strip_nulls(raw)))?;
        conf.container = conf.container.filter(|c| !c.is_empty());
        conf.marker_container = conf.marker_container.filter(|c| !c.is_empty());
        Ok(conf)
    }

    /// Raw object form, used as the base when a payload is re-parsed.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Conf values copied into a question unless it sets them itself.
    ///
    /// `stopOnSuccess` is not copied: questions resolve it against the test
    /// on every read so an exported question only carries its own override.
    pub(crate) fn question_defaults(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("charset".into(), Value::String(self.charset.clone()));
        map
    }

    /// Score rendering parameters.
    pub fn rounding(&self) -> Rounding {
        Rounding {
            digits: self.digits,
            precision: self.precision,
            sign: self.sign,
        }
    }
}

/// Configuration of a [`Question`](crate::question::Question).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionConf {
    /// Declared question number; the replace-in-place key inside a test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<i64>,
    /// Number of answers (kept equal to the live answer count).
    #[serde(rename = "nA")]
    pub answer_count: usize,
    /// 1-based index of the correct answer; `0` means none is correct.
    pub solution: usize,
    /// Explicit override of the owning test's `stopOnSuccess`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_on_success: Option<bool>,
    pub charset: String,
    /// Question text.
    pub txt: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for QuestionConf {
    fn default() -> Self {
        Self {
            num: None,
            answer_count: 4,
            solution: 0,
            stop_on_success: None,
            charset: DEFAULT_CHARSET.to_string(),
            txt: "?".to_string(),
            extra: Map::new(),
        }
    }
}

impl QuestionConf {
    pub fn filter(raw: Map<String, Value>) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(strip_nulls(raw)))?)
    }

    pub(crate) fn answer_defaults(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("charset".into(), Value::String(self.charset.clone()));
        map
    }
}

/// Configuration of an [`Answer`](crate::answer::Answer).
///
/// Answers are flat in the payload, so this record is also the answer's
/// payload form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConf {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<i64>,
    /// Short label ("A", "1", ...); the replace-in-place key inside a question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub charset: String,
    pub txt: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AnswerConf {
    fn default() -> Self {
        Self {
            num: None,
            name: None,
            charset: DEFAULT_CHARSET.to_string(),
            txt: String::new(),
            extra: Map::new(),
        }
    }
}

impl AnswerConf {
    pub fn filter(raw: Map<String, Value>) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(strip_nulls(raw)))?)
    }
}

/// Serialized form of a whole suite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuitePayload {
    pub tests: Vec<TestPayload>,
}

/// Serialized form of one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPayload {
    pub conf: TestConf,
    pub questions: Vec<QuestionPayload>,
}

/// Serialized form of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub conf: QuestionConf,
    pub answers: Vec<AnswerConf>,
}
