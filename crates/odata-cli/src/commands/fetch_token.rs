//! Fetch token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use odata_http::HttpService;

use crate::output;

#[derive(Args, Debug)]
pub struct FetchTokenArgs {
    /// Print the token and cookie values instead of hiding them
    #[arg(long)]
    pub reveal: bool,
}

pub async fn run(service: &HttpService, args: FetchTokenArgs) -> Result<()> {
    eprintln!("{}", "Fetching token...".dimmed());

    let credential = service
        .executor()
        .refresh_token()
        .await
        .context("Failed to fetch token")?;

    output::success("Token fetched");

    let token = match credential.token() {
        Some(token) if args.reveal => token.as_str().to_string(),
        Some(_) => "<hidden>".to_string(),
        None => "<none>".to_string(),
    };
    output::field("Token", &token);

    for cookie in credential.cookies() {
        let value = if args.reveal { cookie.value() } else { "<hidden>" };
        output::field("Cookie", &format!("{}={}", cookie.name(), value));
    }

    Ok(())
}
