//! Core traits for the HTTP transport seam.

mod transport;

pub use transport::{Transport, TransportRequest, TransportResponse};
