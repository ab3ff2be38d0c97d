//! odata-core - CSRF-aware request execution for OData v2 services.
//!
//! This crate provides the transport-agnostic core of an OData v2 client.
//! All authenticated operations flow through a [`RequestExecutor`], which
//! caches the service's anti-forgery token in a [`SessionState`], attaches it
//! to outgoing requests, and transparently refreshes it (retrying exactly
//! once) when the service reports it as invalid.
//!
//! The HTTP round trip itself is delegated to a [`Transport`] implementation;
//! see the `odata-http` crate for the reqwest-backed one.
//!
//! # Example
//!
//! ```no_run
//! use odata_core::{ODataService, QueryOptions, RequestExecutor, Transport};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Material {
//!     #[serde(rename = "Material")]
//!     material: String,
//! }
//!
//! # async fn example<T: Transport>(transport: T) -> odata_core::Result<()> {
//! let service = ODataService::new(RequestExecutor::new(transport), "/sap/opu/odata/sap/ZMM_SRV");
//!
//! let query = QueryOptions::new().top(5).select(["Material"]);
//! let materials: Vec<Material> = service.get_entity_set("MaterialSet", Some(&query)).await?;
//!
//! for material in materials {
//!     println!("{}", material.material);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod query;
pub mod service;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use envelope::EntityPage;
pub use error::Error;
pub use executor::RequestExecutor;
pub use query::QueryOptions;
pub use service::ODataService;
pub use session::{CsrfCredential, SessionState};
pub use tokens::CsrfToken;
pub use traits::{Transport, TransportRequest, TransportResponse};
pub use types::{Cookie, Method, ServiceUrl};

/// Name of the header carrying the anti-forgery token.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Header value asking the service to mint a new token.
pub const CSRF_FETCH: &str = "Fetch";

/// Header value the service uses to signal that a token is required.
pub const CSRF_REQUIRED: &str = "Required";

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
