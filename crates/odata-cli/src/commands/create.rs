//! Create entity command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use odata_http::HttpService;

use super::read_payload;
use crate::output;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Entity set name (e.g. ProductSet)
    pub entity_set: String,

    /// JSON file with the entity (use - for stdin)
    #[arg(long)]
    pub json: String,
}

pub async fn run(service: &HttpService, args: CreateArgs) -> Result<()> {
    let payload = read_payload(&args.json)?;

    let created: Value = service
        .create_entity(&args.entity_set, &payload)
        .await
        .context("Failed to create entity")?;

    output::json_pretty(&created)?;
    output::success(&format!("Created entity in {}", args.entity_set));

    Ok(())
}
