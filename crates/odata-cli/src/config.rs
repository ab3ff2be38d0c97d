//! Turns connection arguments into a ready service handle.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::debug;

use odata_core::{Credentials, ODataService, RequestExecutor, ServiceUrl};
use odata_http::{HttpService, ReqwestTransport};

use crate::cli::ConnectionArgs;

/// Build the transport, executor and service described by `args`.
pub fn connect(args: &ConnectionArgs) -> Result<HttpService> {
    let host = args
        .host
        .as_deref()
        .context("No service host configured. Pass --host or set ODATA_HOST.")?;
    let base = ServiceUrl::new(host).context("Invalid service host")?;

    let mut builder =
        ReqwestTransport::builder(base).timeout(Duration::from_secs(args.timeout_secs));

    match (&args.username, &args.password) {
        (Some(username), Some(password)) => {
            builder = builder.credentials(Credentials::new(username, password));
        }
        (Some(_), None) => bail!("--username requires --password (or ODATA_PASSWORD)"),
        (None, Some(_)) => bail!("--password requires --username (or ODATA_USERNAME)"),
        (None, None) => {}
    }

    let transport = builder.build().context("Failed to create HTTP client")?;

    let mut service = ODataService::new(RequestExecutor::new(transport), &args.service_path);
    if let Some(ref client) = args.sap_client {
        service = service.with_default_param("sap-client", client);
    }

    debug!(
        base = %service.executor().transport().base(),
        service_path = service.service_path(),
        "Configured service"
    );
    Ok(service)
}
