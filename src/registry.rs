//! Provider registry: maps a document's `type` to a launcher constructor.
//!
//! The set of providers is closed ([`ProviderKind`]); the registry decides
//! which of them are reachable by name and is immutable once built.
use crate::error::{LaunchError, LaunchResult};
use crate::launcher::Launcher;
use crate::providers::{FakeLauncher, StaticLauncher};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderKind {
    Fake,
    Static,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Fake, ProviderKind::Static];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Fake => "fake",
            ProviderKind::Static => "static",
        }
    }

    /// Build the launcher variant from its provider parameters.
    pub fn construct(self, params: &Value) -> LaunchResult<Box<dyn Launcher>> {
        let launcher: Box<dyn Launcher> = match self {
            ProviderKind::Fake => Box::new(FakeLauncher::from_params(params)?),
            ProviderKind::Static => Box::new(StaticLauncher::from_params(params)?),
        };
        Ok(launcher)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct LauncherRegistry {
    entries: BTreeMap<&'static str, ProviderKind>,
}

impl LauncherRegistry {
    /// Registry containing every provider compiled into this binary.
    pub fn builtin() -> Self {
        Self::with_providers(&ProviderKind::ALL)
    }

    pub fn with_providers(kinds: &[ProviderKind]) -> Self {
        let entries = kinds.iter().map(|kind| (kind.as_str(), *kind)).collect();
        Self { entries }
    }

    pub fn supported(&self) -> Vec<String> {
        self.entries.keys().map(|name| name.to_string()).collect()
    }

    pub fn lookup(&self, provider_type: &str) -> LaunchResult<ProviderKind> {
        self.entries
            .get(provider_type)
            .copied()
            .ok_or_else(|| LaunchError::UnsupportedProvider {
                provider_type: provider_type.to_string(),
                supported: self.supported(),
            })
    }

    pub fn resolve(
        &self,
        provider_type: &str,
        provider_params: &Value,
    ) -> LaunchResult<Box<dyn Launcher>> {
        let kind = self.lookup(provider_type)?;
        tracing::debug!(provider = %kind, "resolved launcher");
        kind.construct(provider_params)
    }
}
