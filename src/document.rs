//! Typed configuration and artifact documents.
//!
//! Both kinds are parsed into a raw JSON mapping first so missing keys can be
//! reported together, then deserialized into their typed form.
use crate::error::{LaunchError, LaunchResult};
use crate::validate::check_required_keys;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Marker key flagging the configuration schema as provisional.
pub const TEMPORARY_FORMAT_MARKER: &str =
    "this_is_a_temporary_config_format_do_not_put_in_production";

pub const CONFIG_REQUIRED_KEYS: [&str; 3] = ["type", "provider_info", TEMPORARY_FORMAT_MARKER];
pub const ARTIFACT_REQUIRED_KEYS: [&str; 2] = ["type", "provider"];

/// Input to `create`; consumed once and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaunchConfig {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub provider_info: Value,
    #[serde(rename = "this_is_a_temporary_config_format_do_not_put_in_production")]
    pub temporary_format: Value,
    /// Keys the core does not interpret; handed through to the provider.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Durable identity of one created cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterInfo {
    #[serde(rename = "type")]
    pub provider_type: String,
    /// Enough to rebuild the launcher that created the cluster.
    pub provider: Value,
    /// Provider-defined fields (instance ids, addresses, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClusterInfo {
    pub fn new(provider_type: impl Into<String>, provider: Value) -> Self {
        Self {
            provider_type: provider_type.into(),
            provider,
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Load a YAML (or JSON) configuration document from disk.
pub fn load_config(path: &Path) -> LaunchResult<LaunchConfig> {
    let text = read_text(path)?;
    let raw: Value = serde_yaml::from_str(&text).map_err(|err| LaunchError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    from_checked_mapping(path, raw, &CONFIG_REQUIRED_KEYS)
}

/// Load a cluster artifact document from disk.
pub fn load_cluster_info(path: &Path) -> LaunchResult<ClusterInfo> {
    let text = read_text(path)?;
    parse_cluster_info(path, &text)
}

pub fn parse_cluster_info(path: &Path, text: &str) -> LaunchResult<ClusterInfo> {
    let raw: Value = serde_json::from_str(text).map_err(|err| LaunchError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    from_checked_mapping(path, raw, &ARTIFACT_REQUIRED_KEYS)
}

/// Render a value as pretty JSON with a trailing newline. `Value` maps are
/// ordered, so keys come out sorted.
pub fn render_json<T: Serialize>(destination: &Path, value: &T) -> LaunchResult<String> {
    let mut text = serde_json::to_value(value)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .map_err(|err| LaunchError::io("serialize JSON for", destination, err.into()))?;
    text.push('\n');
    Ok(text)
}

fn read_text(path: &Path) -> LaunchResult<String> {
    fs::read_to_string(path).map_err(|err| LaunchError::io("read", path, err))
}

fn from_checked_mapping<T: DeserializeOwned>(
    path: &Path,
    raw: Value,
    required_keys: &[&str],
) -> LaunchResult<T> {
    let mapping = match raw {
        Value::Object(mapping) => mapping,
        other => {
            return Err(LaunchError::Parse {
                path: path.to_path_buf(),
                message: format!(
                    "expected a mapping at the top level, found {}",
                    kind_name(&other)
                ),
            })
        }
    };
    check_required_keys(&mapping, required_keys)?;
    serde_json::from_value(Value::Object(mapping)).map_err(|err| LaunchError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
