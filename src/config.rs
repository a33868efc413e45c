//! Client settings and server-side session options.
//!
//! [`ClientConfiguration`] is the settings bag fetched from the editor after
//! every configuration-changed notification. [`SessionOptions`] are the knobs
//! fixed at startup, either in code or from the `initializationOptions` JSON.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::base::constants::{DEFAULT_SETTLE_DELAY, SUPPORTED_EXTENSIONS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Formatting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormattingOptions {
    pub tab_size: u32,
    pub insert_spaces: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: true,
        }
    }
}

/// Widest indentation level honoured; larger `tabSize` values are clamped.
pub const MAX_TAB_SIZE: u32 = 16;

impl FormattingOptions {
    /// One indentation level.
    pub fn indent_unit(&self) -> String {
        if self.insert_spaces {
            " ".repeat(self.tab_size.min(MAX_TAB_SIZE) as usize)
        } else {
            "\t".to_string()
        }
    }
}

/// Output caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thresholds {
    pub max_problems_per_file: usize,
    pub max_completion_items: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_problems_per_file: 100,
            max_completion_items: 200,
        }
    }
}

/// Settings bag sent by the editor. Replaced wholesale on every change.
///
/// Unknown keys are kept in `extra` so they survive a round-trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfiguration {
    pub formatting: FormattingOptions,
    pub active_language: Option<String>,
    pub thresholds: Thresholds,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ClientConfiguration {
    /// Decode a `workspace/configuration` response.
    ///
    /// The response is an array with one entry per requested section; only
    /// the first is used. `null` yields the default configuration.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let value = match value {
            Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
            other => other,
        };
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// What the stale-diagnostic janitor does once the settle delay elapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErasePolicy {
    /// Publish an empty set for every named URI unconditionally.
    #[default]
    AfterSettleDelay,
    /// Skip URIs that are part of the current model when the delay elapses.
    SkipLiveDocuments,
}

/// Server-side options fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub settle_delay: Duration,
    pub erase_policy: ErasePolicy,
    /// Library sources loaded before the first rebuild.
    pub library_path: Option<PathBuf>,
    pub extensions: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            erase_policy: ErasePolicy::default(),
            library_path: None,
            extensions: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct InitializationOptions {
    settle_delay_ms: Option<u64>,
    library_path: Option<PathBuf>,
    erase_live_documents: Option<bool>,
}

impl SessionOptions {
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_erase_policy(mut self, policy: ErasePolicy) -> Self {
        self.erase_policy = policy;
        self
    }

    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// Read `settleDelayMs`, `libraryPath` and `eraseLiveDocuments` from the
    /// LSP `initializationOptions`. Missing keys keep their defaults.
    pub fn from_initialization_options(value: &Value) -> Result<Self, ConfigError> {
        let mut options = Self::default();
        if value.is_null() {
            return Ok(options);
        }

        let init = InitializationOptions::deserialize(value)?;
        if let Some(ms) = init.settle_delay_ms {
            options.settle_delay = Duration::from_millis(ms);
        }
        options.library_path = init.library_path;
        if init.erase_live_documents == Some(false) {
            options.erase_policy = ErasePolicy::SkipLiveDocuments;
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_configuration() {
        let config = ClientConfiguration::default();
        assert_eq!(config.formatting.tab_size, 4);
        assert!(config.formatting.insert_spaces);
        assert_eq!(config.thresholds.max_problems_per_file, 100);
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_indent_unit_clamps_tab_size() {
        let options = ClientConfiguration::from_value(json!({ "formatting": { "tabSize": 4000000000u32 } }))
            .unwrap()
            .formatting;
        assert_eq!(options.indent_unit().len(), MAX_TAB_SIZE as usize);

        let tabs = FormattingOptions {
            tab_size: u32::MAX,
            insert_spaces: false,
        };
        assert_eq!(tabs.indent_unit(), "\t");
    }

    #[test]
    fn test_from_value_uses_first_section() {
        let value = json!([
            { "formatting": { "tabSize": 2 }, "activeLanguage": "kerml", "x": 1 },
            { "ignored": true }
        ]);
        let config = ClientConfiguration::from_value(value).unwrap();
        assert_eq!(config.formatting.tab_size, 2);
        assert!(config.formatting.insert_spaces);
        assert_eq!(config.active_language.as_deref(), Some("kerml"));
        assert_eq!(config.extra.get("x"), Some(&json!(1)));
        assert!(!config.extra.contains_key("ignored"));
    }

    #[test]
    fn test_from_value_null_is_default() {
        assert_eq!(
            ClientConfiguration::from_value(Value::Null).unwrap(),
            ClientConfiguration::default()
        );
        assert_eq!(
            ClientConfiguration::from_value(json!([])).unwrap(),
            ClientConfiguration::default()
        );
    }

    #[test]
    fn test_from_value_rejects_wrong_types() {
        let result = ClientConfiguration::from_value(json!({ "formatting": { "tabSize": "wide" } }));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_indent_unit() {
        let spaces = FormattingOptions {
            tab_size: 2,
            insert_spaces: true,
        };
        assert_eq!(spaces.indent_unit(), "  ");

        let tabs = FormattingOptions {
            tab_size: 8,
            insert_spaces: false,
        };
        assert_eq!(tabs.indent_unit(), "\t");
    }

    #[test]
    fn test_session_options_from_initialization_options() {
        let options = SessionOptions::from_initialization_options(&json!({
            "settleDelayMs": 50,
            "libraryPath": "/opt/sysml.library",
            "eraseLiveDocuments": false
        }))
        .unwrap();

        assert_eq!(options.settle_delay, Duration::from_millis(50));
        assert_eq!(options.library_path, Some(PathBuf::from("/opt/sysml.library")));
        assert_eq!(options.erase_policy, ErasePolicy::SkipLiveDocuments);
    }

    #[test]
    fn test_session_options_defaults() {
        let options = SessionOptions::from_initialization_options(&json!({})).unwrap();
        assert_eq!(options, SessionOptions::default());
        assert_eq!(options.settle_delay, DEFAULT_SETTLE_DELAY);
        assert_eq!(options.extensions, vec!["sysml", "kerml"]);
    }
}
