//! Update and patch entity command implementation.

use anyhow::{Context, Result};
use clap::Args;

use odata_http::HttpService;

use super::read_payload;
use crate::output;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Entity set name (e.g. ProductSet)
    pub entity_set: String,

    /// Key predicate (e.g. "'HT-1000'")
    pub key: String,

    /// JSON file with the properties to send (use - for stdin)
    #[arg(long)]
    pub json: String,
}

#[derive(Debug, Clone, Copy)]
pub enum Mode {
    /// PUT the whole entity.
    Replace,
    /// PATCH only the given properties.
    Merge,
}

pub async fn run(service: &HttpService, args: UpdateArgs, mode: Mode) -> Result<()> {
    let payload = read_payload(&args.json)?;

    match mode {
        Mode::Replace => service
            .update_entity(&args.entity_set, &args.key, &payload)
            .await
            .context("Failed to update entity")?,
        Mode::Merge => service
            .patch_entity(&args.entity_set, &args.key, &payload)
            .await
            .context("Failed to patch entity")?,
    }

    output::success(&format!("Updated {}({})", args.entity_set, args.key));

    Ok(())
}
