//! Log level selection and subscriber setup.
//!
//! Noisy HTTP/TLS dependencies are held one level above the requested level,
//! except at `trace` and `critical` where the requested level applies to all.
use crate::error::{LaunchError, LaunchResult};
use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Dependencies whose logs drown out ours at the same level.
pub const NOISY_TARGETS: [&str; 3] = ["ureq", "ureq_proto", "rustls"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse an operator-supplied level name, ignoring case.
    pub fn parse(name: &str) -> LaunchResult<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).map_err(|_| {
            let known: Vec<String> = Self::value_variants()
                .iter()
                .filter_map(ValueEnum::to_possible_value)
                .map(|value| value.get_name().to_string())
                .collect();
            LaunchError::InvalidOption(format!(
                "unknown log level {name:?} (expected one of: {})",
                known.join(", ")
            ))
        })
    }

    fn directive(self) -> &'static str {
        match self {
            // tracing has no level above error
            LogLevel::Critical | LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// One step quieter than the requested level, or `None` when noisy
    /// targets should follow the requested level.
    fn dampened_directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Critical | LogLevel::Trace => None,
            LogLevel::Error => Some("off"),
            LogLevel::Warning => Some("error"),
            LogLevel::Info => Some("warn"),
            LogLevel::Debug => Some("info"),
        }
    }
}

/// Build the filter directive string for a level, with optional operator
/// overrides (`RUST_LOG` syntax) appended last so they win.
pub fn filter_directives(level: LogLevel, overrides: Option<&str>) -> String {
    let mut directives = vec![level.directive().to_string()];
    if let Some(dampened) = level.dampened_directive() {
        directives.extend(
            NOISY_TARGETS
                .iter()
                .map(|target| format!("{target}={dampened}")),
        );
    }
    if let Some(overrides) = overrides.map(str::trim).filter(|value| !value.is_empty()) {
        directives.push(overrides.to_string());
    }
    directives.join(",")
}

/// Install the global subscriber. Logs go to stderr; stdout is reserved for
/// command output.
pub fn init(level: LogLevel) -> anyhow::Result<()> {
    let overrides = std::env::var("RUST_LOG").ok();
    let directives = filter_directives(level, overrides.as_deref());
    let filter = EnvFilter::try_new(&directives)
        .map_err(|err| anyhow::anyhow!("invalid log filter {directives:?}: {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("install log subscriber: {err}"))?;
    Ok(())
}
