//! Response classification and OData error body parsing.

use serde::Deserialize;

use crate::error::ServiceError;
use crate::traits::TransportResponse;
use crate::types::Method;
use crate::{CSRF_HEADER, CSRF_REQUIRED};

/// How the executor should treat a response.
#[derive(Debug, Clone)]
pub enum Classification {
    /// 2xx response; handed back to the caller as-is.
    Success,
    /// The anti-forgery token is missing or stale. Carries the response
    /// rendered as a service error, for when no retry is left.
    CredentialInvalid(ServiceError),
    /// Any other error status. Never retried.
    Failed(ServiceError),
}

/// Classify a response to a request sent with `method`.
///
/// A response is "credential invalid" iff the method is state-mutating and
/// either the status is 403 or the service explicitly answers
/// `X-CSRF-Token: Required`.
pub fn classify(method: Method, response: &TransportResponse) -> Classification {
    if method.is_state_mutating() && signals_invalid_token(response) {
        return Classification::CredentialInvalid(parse_service_error(
            response.status,
            &response.body,
        ));
    }

    if response.is_success() {
        Classification::Success
    } else {
        Classification::Failed(parse_service_error(response.status, &response.body))
    }
}

fn signals_invalid_token(response: &TransportResponse) -> bool {
    response.status == 403
        || response
            .header(CSRF_HEADER)
            .is_some_and(|value| value.eq_ignore_ascii_case(CSRF_REQUIRED))
}

/// OData v2 error body: `{"error": {"code": .., "message": {"lang": .., "value": ..}}}`.
#[derive(Debug, Deserialize)]
struct ODataErrorBody {
    error: ODataErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ODataErrorDetail {
    code: String,
    message: ODataErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ODataErrorMessage {
    #[serde(default)]
    lang: Option<String>,
    value: String,
}

/// Build a [`ServiceError`] from an error response body.
///
/// Structured OData errors populate code, message and language; anything
/// else is kept as the raw body.
pub fn parse_service_error(status: u16, body: &[u8]) -> ServiceError {
    match serde_json::from_slice::<ODataErrorBody>(body) {
        Ok(parsed) => ServiceError {
            status,
            code: Some(parsed.error.code),
            message: Some(parsed.error.message.value),
            language: parsed.error.message.lang,
            body: body.to_vec(),
        },
        Err(_) => ServiceError::raw(status, body),
    }
}
