//! odata-http - reqwest-backed transport for odata-core.
//!
//! # Example
//!
//! ```no_run
//! use odata_core::{Credentials, ODataService, RequestExecutor, ServiceUrl};
//! use odata_http::ReqwestTransport;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::builder(ServiceUrl::new("https://sapes5.sapdevcenter.com")?)
//!     .credentials(Credentials::new("DEVELOPER", "secret"))
//!     .build()?;
//!
//! let service = ODataService::new(
//!     RequestExecutor::new(transport),
//!     "/sap/opu/odata/IWBEP/GWSAMPLE_BASIC",
//! );
//! let products: Vec<serde_json::Value> = service.get_entity_set("ProductSet", None).await?;
//! # Ok(())
//! # }
//! ```

mod transport;

pub use transport::{DEFAULT_TIMEOUT, ReqwestTransport, ReqwestTransportBuilder};

/// Service handle over the reqwest transport.
pub type HttpService = odata_core::ODataService<ReqwestTransport>;
