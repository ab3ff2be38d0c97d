//! Delete entity command implementation.

use anyhow::{Context, Result};
use clap::Args;

use odata_http::HttpService;

use crate::output;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Entity set name (e.g. ProductSet)
    pub entity_set: String,

    /// Key predicate (e.g. "'HT-1000'")
    pub key: String,
}

pub async fn run(service: &HttpService, args: DeleteArgs) -> Result<()> {
    service
        .delete_entity(&args.entity_set, &args.key)
        .await
        .context("Failed to delete entity")?;

    output::success(&format!("Deleted {}({})", args.entity_set, args.key));

    Ok(())
}
