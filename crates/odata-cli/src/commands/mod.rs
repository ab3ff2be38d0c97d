//! Subcommand implementations.

mod create;
mod delete;
mod fetch_token;
mod get;
mod list;
mod request;
mod update;

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::Value;

use crate::cli::ConnectionArgs;
use crate::config;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the entities of an entity set
    List(list::ListArgs),

    /// Fetch a single entity by key
    Get(get::GetArgs),

    /// Create an entity from JSON
    Create(create::CreateArgs),

    /// Replace an entity (PUT)
    Update(update::UpdateArgs),

    /// Update some properties of an entity (PATCH)
    Patch(update::UpdateArgs),

    /// Delete an entity
    Delete(delete::DeleteArgs),

    /// Fetch a fresh anti-forgery token
    FetchToken(fetch_token::FetchTokenArgs),

    /// Send a raw request below the service root
    Request(request::RequestArgs),
}

pub async fn handle(command: Command, connection: &ConnectionArgs) -> Result<()> {
    let service = config::connect(connection)?;

    match command {
        Command::List(args) => list::run(&service, args).await,
        Command::Get(args) => get::run(&service, args).await,
        Command::Create(args) => create::run(&service, args).await,
        Command::Update(args) => update::run(&service, args, update::Mode::Replace).await,
        Command::Patch(args) => update::run(&service, args, update::Mode::Merge).await,
        Command::Delete(args) => delete::run(&service, args).await,
        Command::FetchToken(args) => fetch_token::run(&service, args).await,
        Command::Request(args) => request::run(&service, args).await,
    }
}

/// Read a JSON payload from a file, or from stdin when `path` is `-`.
fn read_payload(path: &str) -> Result<Value> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        serde_json::from_str(&buf).context("Invalid JSON from stdin")
    } else {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON file {path}"))?;
        serde_json::from_str(&content).context("Invalid JSON in file")
    }
}

/// Split comma-separated values from repeated flags.
fn split_list(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect()
}
