//! CLI argument parsing for the cluster lifecycle phases.
//!
//! One subcommand per phase; every phase shares the log level and artifact
//! path options so any invocation can be pointed at a specific cluster.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_INFO_PATH: &str = "cluster_info.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "cluster-launch",
    version,
    about = "Create, wait on, describe, test, and delete a cluster deployment",
    after_help = "Examples:\n  cluster-launch create -c config.yaml -i cluster_info.json\n  cluster-launch wait\n  cluster-launch describe\n  cluster-launch pytest -e AWS_ACCESS_KEY_ID,AWS_SECRET_ACCESS_KEY -- -k test_dns\n  cluster-launch delete",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the cluster described in --config-path and write --info-path
    Create(CreateArgs),
    /// Block until the cluster is up and running
    Wait(PhaseArgs),
    /// Print the composition of the cluster as JSON
    Describe(PhaseArgs),
    /// Run the integration test suite against the cluster
    Pytest(PytestArgs),
    /// Tear down the cluster deployment
    Delete(PhaseArgs),
}

impl Command {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Command::Create(args) => &args.common,
            Command::Wait(args) | Command::Describe(args) | Command::Delete(args) => &args.common,
            Command::Pytest(args) => &args.common,
        }
    }
}

// accepted by every phase
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// One of: critical, error, warning, info, debug, trace (any case)
    // parsed by `LogLevel::parse` so an unknown name is reported like any
    // other handled error
    #[arg(short = 'L', long, value_name = "LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// JSON file written by create and consumed by every later phase
    #[arg(short = 'i', long, value_name = "PATH", default_value = DEFAULT_INFO_PATH)]
    pub info_path: PathBuf,
}

// create also needs the config document
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path for config to create cluster from
    #[arg(short = 'c', long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,
}

// wait, describe, and delete only need the artifact
#[derive(Args, Debug)]
pub struct PhaseArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct PytestArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Comma-delimited environment variable names passed from the local environment
    #[arg(short = 'e', long, value_name = "LIST")]
    pub env: Option<String>,

    /// Extra arguments appended verbatim to the test runner
    #[arg(
        value_name = "PYTEST_EXTRAS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub pytest_extras: Vec<String>,
}
