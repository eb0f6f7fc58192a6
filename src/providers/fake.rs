//! Simulated local cluster.
//!
//! `provider_info` and the artifact's `provider` section share one shape: the
//! node counts, with defaults filled in. `create` adds a generated
//! `cluster_id` and synthetic `hosts` addresses next to it.
use super::{host_context, parse_params};
use crate::document::{ClusterInfo, LaunchConfig};
use crate::error::{LaunchError, LaunchResult};
use crate::launcher::{shell, Launcher, TestInvocation};
use crate::registry::ProviderKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const PROVIDER: &str = "fake";
const MAX_NODES_PER_ROLE: u32 = 254;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FakeParams {
    #[serde(default = "default_masters")]
    pub masters: u32,
    #[serde(default = "default_agents")]
    pub agents: u32,
    #[serde(default)]
    pub public_agents: u32,
}

fn default_masters() -> u32 {
    1
}

fn default_agents() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FakeHosts {
    masters: Vec<String>,
    agents: Vec<String>,
    #[serde(default)]
    public_agents: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FakeLauncher {
    params: FakeParams,
}

impl FakeLauncher {
    pub fn from_params(params: &Value) -> LaunchResult<Self> {
        let params: FakeParams = parse_params(PROVIDER, params)?;
        if params.masters == 0 {
            return Err(LaunchError::provider_config(
                PROVIDER,
                "masters must be at least 1",
            ));
        }
        for (role, count) in [
            ("masters", params.masters),
            ("agents", params.agents),
            ("public_agents", params.public_agents),
        ] {
            if count > MAX_NODES_PER_ROLE {
                return Err(LaunchError::provider_config(
                    PROVIDER,
                    format!("{role} must be at most {MAX_NODES_PER_ROLE} (got {count})"),
                ));
            }
        }
        Ok(Self { params })
    }

    fn cluster(&self, info: &ClusterInfo) -> LaunchResult<(String, FakeHosts)> {
        let cluster_id = info
            .field("cluster_id")
            .and_then(Value::as_str)
            .ok_or_else(|| LaunchError::provider_config(PROVIDER, "artifact has no cluster_id"))?
            .to_string();
        let hosts = info
            .field("hosts")
            .cloned()
            .ok_or_else(|| LaunchError::provider_config(PROVIDER, "artifact has no hosts"))?;
        let hosts: FakeHosts = serde_json::from_value(hosts).map_err(|err| {
            LaunchError::provider_config(PROVIDER, format!("artifact hosts: {err}"))
        })?;
        Ok((cluster_id, hosts))
    }
}

fn synthetic_hosts(subnet: u8, count: u32) -> Vec<String> {
    (1..=count).map(|host| format!("10.0.{subnet}.{host}")).collect()
}

fn generate_cluster_id() -> LaunchResult<String> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| LaunchError::provision(PROVIDER, err))?
        .as_nanos();
    Ok(format!("fake-{:x}{:x}", nanos, std::process::id()))
}

impl Launcher for FakeLauncher {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Fake
    }

    fn create(&self, _config: &LaunchConfig) -> LaunchResult<ClusterInfo> {
        let cluster_id = generate_cluster_id()?;
        let hosts = FakeHosts {
            masters: synthetic_hosts(0, self.params.masters),
            agents: synthetic_hosts(1, self.params.agents),
            public_agents: synthetic_hosts(2, self.params.public_agents),
        };
        let provider =
            serde_json::to_value(&self.params).map_err(|err| LaunchError::provision(PROVIDER, err))?;
        let hosts =
            serde_json::to_value(&hosts).map_err(|err| LaunchError::provision(PROVIDER, err))?;
        tracing::info!(%cluster_id, masters = self.params.masters, agents = self.params.agents, "fake cluster created");
        Ok(ClusterInfo::new(PROVIDER, provider)
            .with_field("cluster_id", Value::String(cluster_id))
            .with_field("hosts", hosts))
    }

    fn wait(&self, info: &ClusterInfo) -> LaunchResult<()> {
        let (cluster_id, _) = self.cluster(info)?;
        tracing::info!(%cluster_id, "fake cluster is ready");
        Ok(())
    }

    fn describe(&self, info: &ClusterInfo) -> LaunchResult<Value> {
        let (cluster_id, hosts) = self.cluster(info)?;
        Ok(json!({
            "cluster_id": cluster_id,
            "masters": hosts.masters,
            "agents": hosts.agents,
            "public_agents": hosts.public_agents,
        }))
    }

    fn test(&self, info: &ClusterInfo, invocation: &TestInvocation) -> LaunchResult<i32> {
        let (cluster_id, hosts) = self.cluster(info)?;
        let mut context = host_context(&hosts.masters, &hosts.agents, &hosts.public_agents);
        context.push(("CLUSTER_ID".to_string(), cluster_id));
        shell::run_invocation(invocation, &context)
    }

    fn delete(&self, info: &ClusterInfo) -> LaunchResult<()> {
        match info.field("cluster_id").and_then(Value::as_str) {
            Some(cluster_id) => tracing::info!(%cluster_id, "fake cluster released"),
            None => tracing::warn!("artifact has no cluster_id; nothing to release"),
        }
        Ok(())
    }
}
