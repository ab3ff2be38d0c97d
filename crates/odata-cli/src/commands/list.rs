//! List entities command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use serde_json::Value;

use odata_core::QueryOptions;
use odata_http::HttpService;

use super::split_list;
use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Entity set name (e.g. ProductSet)
    pub entity_set: String,

    /// $filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// Properties to select (comma-separated or repeated)
    #[arg(long)]
    pub select: Vec<String>,

    /// Navigation properties to expand (comma-separated or repeated)
    #[arg(long)]
    pub expand: Vec<String>,

    /// Ordering clause, e.g. "Name" or "Price desc" (repeatable)
    #[arg(long = "order-by")]
    pub order_by: Vec<String>,

    /// Maximum number of entities to return
    #[arg(long)]
    pub top: Option<u32>,

    /// Number of entities to skip
    #[arg(long)]
    pub skip: Option<u32>,

    /// Request the total count of the entity set
    #[arg(long)]
    pub count: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(service: &HttpService, args: ListArgs) -> Result<()> {
    let query = build_query(&args)?;

    let page = service
        .get_entity_set_page::<Value>(&args.entity_set, Some(&query))
        .await
        .context("Failed to list entities")?;

    if page.results.is_empty() {
        eprintln!("{}", "No entities found.".dimmed());
    }

    for entity in &page.results {
        if args.pretty {
            output::json_pretty(entity)?;
        } else {
            output::json(entity)?;
        }
    }

    if let Some(count) = page.count {
        eprintln!("{}: {}", "Total count".dimmed(), count);
    }
    if let Some(next) = &page.next {
        eprintln!("{}: {}", "Next page".dimmed(), next);
    }

    Ok(())
}

fn build_query(args: &ListArgs) -> Result<QueryOptions> {
    let mut query = QueryOptions::new();

    if let Some(ref filter) = args.filter {
        query = query.filter(filter);
    }
    let select = split_list(&args.select);
    if !select.is_empty() {
        query = query.select(select);
    }
    let expand = split_list(&args.expand);
    if !expand.is_empty() {
        query = query.expand(expand);
    }
    for clause in &args.order_by {
        let (field, ascending) = parse_order_by(clause)?;
        query = query.order_by(field, ascending);
    }
    if let Some(top) = args.top {
        query = query.top(top);
    }
    if let Some(skip) = args.skip {
        query = query.skip(skip);
    }
    if args.count {
        query = query.inline_count(true);
    }

    Ok(query)
}

/// Parse `Field`, `Field asc` or `Field desc`.
fn parse_order_by(clause: &str) -> Result<(&str, bool)> {
    let mut parts = clause.split_whitespace();
    let Some(field) = parts.next() else {
        bail!("Empty --order-by clause");
    };
    let ascending = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => true,
        Some("desc") => false,
        Some(other) => bail!("Invalid sort direction '{other}' (expected asc or desc)"),
    };
    if parts.next().is_some() {
        bail!("Invalid --order-by clause '{clause}'");
    }
    Ok((field, ascending))
}
