//! Error types for the odata-core library.
//!
//! This module provides a unified error type with explicit variants for
//! transport, credential refresh, service, decoding and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for OData operations.
///
/// Every failure is returned to the immediate caller; the only recovery
/// performed internally is the single refresh-and-retry on an invalid
/// anti-forgery token.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, malformed response).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The anti-forgery token could not be refreshed.
    #[error("failed to refresh credential: {0}")]
    Fetch(#[from] FetchError),

    /// The service answered with an error status.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// The response body did not match the expected envelope or entity shape.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Input validation errors (invalid URL, unserializable payload).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP or protocol error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Errors raised while fetching a fresh anti-forgery token.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Both probe requests failed at the transport level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The probe fallback answered with an error status.
    #[error("token fetch failed with status: {status}")]
    Status { status: u16 },

    /// The probe succeeded but carried no token header.
    #[error("csrf token header not found in response")]
    TokenHeaderMissing,
}

/// An error response from the service.
///
/// When the body follows the OData error format
/// `{"error": {"code": .., "message": {"lang": .., "value": ..}}}` the parsed
/// fields are populated; otherwise only the raw body is kept.
#[derive(Debug, Clone)]
pub struct ServiceError {
    /// HTTP status code.
    pub status: u16,
    /// OData error code (if present).
    pub code: Option<String>,
    /// Error message from the service.
    pub message: Option<String>,
    /// Language of the message.
    pub language: Option<String>,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        match self.message {
            Some(ref message) => write!(f, ": {}", message)?,
            None if !self.body.is_empty() => {
                write!(f, ": {}", String::from_utf8_lossy(&self.body))?
            }
            None => {}
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    /// Create an error carrying only the raw body.
    pub fn raw(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            code: None,
            message: None,
            language: None,
            body: body.into(),
        }
    }

    /// Returns true if the body was a structured OData error.
    pub fn is_structured(&self) -> bool {
        self.code.is_some() || self.message.is_some()
    }

    /// Check if the service reported a missing resource.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// The response body did not match the expected shape.
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct DecodeError {
    reason: String,
    body: Vec<u8>,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>, body: &[u8]) -> Self {
        Self {
            reason: reason.into(),
            body: body.to_vec(),
        }
    }

    /// Returns why decoding failed.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the undecodable body, for diagnostics.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid service URL format.
    #[error("invalid service URL '{value}': {reason}")]
    ServiceUrl { value: String, reason: String },

    /// Unknown HTTP method.
    #[error("invalid method '{value}'")]
    Method { value: String },

    /// Request payload could not be serialized.
    #[error("invalid payload: {reason}")]
    Payload { reason: String },
}
