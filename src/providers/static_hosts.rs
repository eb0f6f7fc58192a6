//! Pre-provisioned hosts (bare metal or on-premises).
//!
//! The artifact's `provider` section is `provider_info` normalized: host lists
//! plus every probe and wait setting with its default written out, so later
//! phases never depend on defaults that may change between releases.
use super::{host_context, parse_params};
use crate::document::{ClusterInfo, LaunchConfig};
use crate::error::{LaunchError, LaunchResult};
use crate::launcher::{shell, Launcher, TestInvocation};
use crate::registry::ProviderKind;
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::ToSocketAddrs;
use std::time::{Duration, Instant};

const PROVIDER: &str = "static";
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticParams {
    pub master_list: Vec<String>,
    #[serde(default)]
    pub agent_list: Vec<String>,
    #[serde(default)]
    pub public_agent_list: Vec<String>,
    #[serde(default = "default_health_port")]
    pub health_port: u16,
    #[serde(default = "default_health_path")]
    pub health_path: String,
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    #[serde(default = "default_wait_interval_secs")]
    pub wait_interval_secs: u64,
}

fn default_health_port() -> u16 {
    80
}

fn default_health_path() -> String {
    "/".to_string()
}

fn default_wait_timeout_secs() -> u64 {
    30 * 60
}

fn default_wait_interval_secs() -> u64 {
    10
}

impl StaticParams {
    fn validate(&self) -> Result<(), String> {
        if self.master_list.is_empty() {
            return Err("master_list must name at least one host".to_string());
        }
        let all_hosts = self
            .master_list
            .iter()
            .chain(&self.agent_list)
            .chain(&self.public_agent_list);
        for host in all_hosts {
            if host.trim().is_empty() || host.contains(char::is_whitespace) {
                return Err(format!("invalid host entry {host:?}"));
            }
        }
        if !self.health_path.starts_with('/') {
            return Err(format!(
                "health_path must start with '/' (got {:?})",
                self.health_path
            ));
        }
        if self.wait_interval_secs == 0 {
            return Err("wait_interval_secs must be positive".to_string());
        }
        Ok(())
    }

    fn health_url(&self, host: &str) -> String {
        format!("http://{host}:{}{}", self.health_port, self.health_path)
    }
}

#[derive(Debug, Clone)]
pub struct StaticLauncher {
    params: StaticParams,
}

impl StaticLauncher {
    pub fn from_params(params: &Value) -> LaunchResult<Self> {
        let params: StaticParams = parse_params(PROVIDER, params)?;
        params
            .validate()
            .map_err(|message| LaunchError::provider_config(PROVIDER, message))?;
        Ok(Self { params })
    }

    fn all_hosts(&self) -> impl Iterator<Item = &String> {
        self.params
            .master_list
            .iter()
            .chain(&self.params.agent_list)
            .chain(&self.params.public_agent_list)
    }

    /// Probe every master once; returns the failures.
    fn probe_masters(&self, agent: &ureq::Agent) -> Vec<String> {
        self.params
            .master_list
            .iter()
            .filter_map(|host| {
                let url = self.params.health_url(host);
                probe(agent, &url).err().map(|err| format!("{err:#}"))
            })
            .collect()
    }
}

fn probe(agent: &ureq::Agent, url: &str) -> anyhow::Result<()> {
    let response = agent.get(url).call().with_context(|| format!("GET {url}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("GET {url}: HTTP {status}"));
    }
    Ok(())
}

fn resolve_host(host: &str, port: u16) -> anyhow::Result<()> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .with_context(|| format!("resolve host {host}"))?;
    addrs
        .next()
        .map(|_| ())
        .ok_or_else(|| anyhow!("resolve host {host}: no addresses"))
}

impl Launcher for StaticLauncher {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Static
    }

    fn create(&self, _config: &LaunchConfig) -> LaunchResult<ClusterInfo> {
        for host in self.all_hosts() {
            resolve_host(host, self.params.health_port)
                .map_err(|err| LaunchError::provision(PROVIDER, err))?;
        }
        let provider =
            serde_json::to_value(&self.params).map_err(|err| LaunchError::provision(PROVIDER, err))?;
        tracing::info!(
            masters = self.params.master_list.len(),
            agents = self.params.agent_list.len(),
            public_agents = self.params.public_agent_list.len(),
            "static hosts registered"
        );
        Ok(ClusterInfo::new(PROVIDER, provider))
    }

    fn wait(&self, _info: &ClusterInfo) -> LaunchResult<()> {
        // probes go straight to the hosts, never through an environment proxy
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .proxy(None)
            .timeout_global(Some(PROBE_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        let budget = Duration::from_secs(self.params.wait_timeout_secs);
        let interval = Duration::from_secs(self.params.wait_interval_secs);
        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let failures = self.probe_masters(&agent);
            if failures.is_empty() {
                tracing::info!(attempt, elapsed_ms = start.elapsed().as_millis(), "all masters healthy");
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed >= budget {
                tracing::error!(attempt, failing = failures.len(), "health budget exhausted");
                return Err(LaunchError::ClusterUnhealthy {
                    message: format!(
                        "{} of {} masters unhealthy after {} attempts over {}s: {}",
                        failures.len(),
                        self.params.master_list.len(),
                        attempt,
                        elapsed.as_secs(),
                        failures.join("; ")
                    ),
                });
            }

            let delay = interval.min(budget - elapsed);
            tracing::warn!(
                attempt,
                failing = failures.len(),
                delay_ms = delay.as_millis(),
                "masters not healthy yet, retrying"
            );
            std::thread::sleep(delay);
        }
    }

    fn describe(&self, _info: &ClusterInfo) -> LaunchResult<Value> {
        Ok(json!({
            "masters": self.params.master_list,
            "agents": self.params.agent_list,
            "public_agents": self.params.public_agent_list,
            "health_endpoint": self.params.health_url("<master>"),
        }))
    }

    fn test(&self, _info: &ClusterInfo, invocation: &TestInvocation) -> LaunchResult<i32> {
        let context = host_context(
            &self.params.master_list,
            &self.params.agent_list,
            &self.params.public_agent_list,
        );
        shell::run_invocation(invocation, &context)
    }

    fn delete(&self, _info: &ClusterInfo) -> LaunchResult<()> {
        tracing::info!(
            hosts = self.all_hosts().count(),
            "static hosts are not owned by this tool; nothing to tear down"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "static_hosts_tests.rs"]
mod tests;
