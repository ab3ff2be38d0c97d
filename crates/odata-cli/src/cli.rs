//! CLI argument definitions.

use clap::{Args, Parser};

use crate::commands::Command;

/// OData v2 CLI tool for service exploration.
#[derive(Parser, Debug)]
#[command(name = "odata")]
#[command(author, version = env!("ODATA_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where and how to reach the service. Every flag falls back to an
/// environment variable, which may also come from a `.env` file.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Base URL of the service host (e.g. https://sapes5.sapdevcenter.com)
    #[arg(long, env = "ODATA_HOST", global = true)]
    pub host: Option<String>,

    /// Basic auth user
    #[arg(long, env = "ODATA_USERNAME", global = true)]
    pub username: Option<String>,

    /// Basic auth password
    #[arg(long, env = "ODATA_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Path of the OData service (e.g. /sap/opu/odata/IWBEP/GWSAMPLE_BASIC)
    #[arg(long, env = "ODATA_SERVICE_PATH", default_value = "/", global = true)]
    pub service_path: String,

    /// SAP client sent as `sap-client` with every request
    #[arg(long, env = "ODATA_SAP_CLIENT", global = true)]
    pub sap_client: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "ODATA_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}
