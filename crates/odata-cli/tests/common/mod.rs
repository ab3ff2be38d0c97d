use std::path::Path;
use std::process::Output;

use tokio::process::Command;

/// Service path used by every mock.
pub const SERVICE_PATH: &str = "/sap/opu/odata/IWBEP/GWSAMPLE_BASIC";

const CONFIG_VARS: &[&str] = &[
    "ODATA_HOST",
    "ODATA_USERNAME",
    "ODATA_PASSWORD",
    "ODATA_SERVICE_PATH",
    "ODATA_SAP_CLIENT",
    "ODATA_TIMEOUT_SECS",
];

/// Build a CLI invocation isolated from the caller's configuration.
///
/// The working directory is `cwd` so no stray `.env` file is picked up.
pub fn cli(cwd: &Path, host: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_odata"));
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd.current_dir(cwd)
        .env("NO_COLOR", "1")
        .env("ODATA_HOST", host)
        .env("ODATA_SERVICE_PATH", SERVICE_PATH)
        .env("ODATA_USERNAME", "DEVELOPER")
        .env("ODATA_PASSWORD", "secret");
    cmd
}

/// Run the CLI with arguments and collect its output.
pub async fn run_cli(cwd: &Path, host: &str, args: &[&str]) -> Output {
    cli(cwd, host)
        .args(args)
        .output()
        .await
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(cwd: &Path, host: &str, args: &[&str]) -> String {
    let output = run_cli(cwd, host, args).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn entity_set_path(set: &str) -> String {
    format!("{SERVICE_PATH}/{set}")
}
