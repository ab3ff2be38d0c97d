//! Get entity command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use odata_core::QueryOptions;
use odata_http::HttpService;

use super::split_list;
use crate::output;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Entity set name (e.g. ProductSet)
    pub entity_set: String,

    /// Key predicate (e.g. "'HT-1000'" or "Id='1',Type='A'")
    pub key: String,

    /// Properties to select (comma-separated or repeated)
    #[arg(long)]
    pub select: Vec<String>,

    /// Navigation properties to expand (comma-separated or repeated)
    #[arg(long)]
    pub expand: Vec<String>,
}

pub async fn run(service: &HttpService, args: GetArgs) -> Result<()> {
    let mut query = QueryOptions::new();
    let select = split_list(&args.select);
    if !select.is_empty() {
        query = query.select(select);
    }
    let expand = split_list(&args.expand);
    if !expand.is_empty() {
        query = query.expand(expand);
    }

    let entity: Value = service
        .get_entity(&args.entity_set, &args.key, Some(&query))
        .await
        .context("Failed to get entity")?;

    output::json_pretty(&entity)?;

    Ok(())
}
