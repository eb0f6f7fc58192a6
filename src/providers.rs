//! In-tree provider backends.
//!
//! Each backend documents how its `provider_info` maps onto the `provider`
//! section it writes into the artifact.
use crate::error::{LaunchError, LaunchResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

mod fake;
mod static_hosts;

pub use fake::FakeLauncher;
pub use static_hosts::StaticLauncher;

/// Deserialize provider parameters, treating an absent/null section as empty.
pub(crate) fn parse_params<T: DeserializeOwned>(provider: &str, params: &Value) -> LaunchResult<T> {
    let params = match params {
        Value::Null => Value::Object(serde_json::Map::new()),
        Value::Object(_) => params.clone(),
        other => {
            return Err(LaunchError::provider_config(
                provider,
                format!("expected a mapping, found {other}"),
            ))
        }
    };
    serde_json::from_value(params)
        .map_err(|err| LaunchError::provider_config(provider, err.to_string()))
}

/// Environment handed to test commands describing cluster membership.
pub(crate) fn host_context(
    masters: &[String],
    agents: &[String],
    public_agents: &[String],
) -> Vec<(String, String)> {
    vec![
        ("MASTER_HOSTS".to_string(), masters.join(",")),
        ("SLAVE_HOSTS".to_string(), agents.join(",")),
        ("PUBLIC_SLAVE_HOSTS".to_string(), public_agents.join(",")),
    ]
}
