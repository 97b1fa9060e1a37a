//! `quizmark.toml` loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level quizmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizmarkConfig {
    /// Output directory for session reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Conf keys merged over every test when a suite is parsed.
    #[serde(default)]
    pub test_defaults: toml::Table,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizmark-results")
}

impl Default for QuizmarkConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            test_defaults: toml::Table::new(),
        }
    }
}

impl QuizmarkConfig {
    /// `test_defaults` as the extra conf handed to the parser, with
    /// `${VAR}` references resolved.
    pub fn extra_conf(&self) -> Result<Map<String, Value>> {
        let value = serde_json::to_value(&self.test_defaults)
            .context("failed to convert test_defaults")?;
        match resolve_value(value) {
            Value::Object(map) => Ok(map),
            _ => anyhow::bail!("test_defaults is not a table"),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(resolve_env_vars(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(resolve_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, resolve_value(v)))
                .collect(),
        ),
        other => other,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `quizmark.toml` in the current directory
/// 2. `~/.config/quizmark/config.toml`
///
/// Environment variable override: `QUIZMARK_STOP_ON_SUCCESS`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizmark.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuizmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => QuizmarkConfig::default(),
    };

    if let Ok(raw) = std::env::var("QUIZMARK_STOP_ON_SUCCESS") {
        match parse_flag(&raw) {
            Some(flag) => {
                config
                    .test_defaults
                    .insert("stopOnSuccess".into(), toml::Value::Boolean(flag));
            }
            None => tracing::warn!(value = %raw, "ignoring invalid QUIZMARK_STOP_ON_SUCCESS"),
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmark"))
}
