//! Raw request command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use serde_json::Value;

use odata_core::{Method, QueryOptions};
use odata_http::HttpService;

use super::read_payload;
use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS)
    pub method: Method,

    /// Path below the service root (e.g. ReleaseOrder or $metadata)
    pub path: String,

    /// JSON file with the request body (use - for stdin)
    #[arg(long)]
    pub json: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short = 'q')]
    pub query: Vec<String>,
}

pub async fn run(service: &HttpService, args: RequestArgs) -> Result<()> {
    let body = match args.json {
        Some(ref path) => Some(serde_json::to_vec(&read_payload(path)?)?),
        None => None,
    };

    let mut query = QueryOptions::new();
    for pair in &args.query {
        let (key, value) = parse_query_pair(pair)?;
        query = query.param(key, value);
    }

    let response = service
        .request(args.method, &args.path, body, Some(&query))
        .await
        .with_context(|| format!("{} {} failed", args.method, args.path))?;

    eprintln!("{}: {}", "Status".dimmed(), response.status);

    if response.body.is_empty() {
        return Ok(());
    }
    match serde_json::from_slice::<Value>(&response.body) {
        Ok(value) => output::json_pretty(&value)?,
        Err(_) => println!("{}", String::from_utf8_lossy(&response.body)),
    }

    Ok(())
}

fn parse_query_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => bail!("Invalid query parameter '{pair}' (expected key=value)"),
    }
}
