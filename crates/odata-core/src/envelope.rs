//! Decoding of OData v2 JSON response envelopes.
//!
//! OData v2 wraps every payload in a top-level `d` object. Collections put
//! their entities in `d.results`; single entities usually put their
//! properties directly in `d`, though some services wrap them in
//! `d.results` too. The decoder looks at the document itself to tell the
//! two apart, so callers only state the type they want.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Top-level envelope field.
pub const ENVELOPE_FIELD: &str = "d";

/// Field holding collection results inside the envelope.
pub const RESULTS_FIELD: &str = "results";

/// Decode an enveloped response body into `T`.
///
/// `T` is the entity type for single-entity responses or a `Vec` of it for
/// collections.
///
/// # Errors
///
/// Returns a [`DecodeError`] carrying the body if it is not JSON, has no `d`
/// field, or its payload does not match `T`.
///
/// # Example
///
/// ```
/// use odata_core::envelope::decode;
///
/// let ids: Vec<serde_json::Value> = decode(br#"{"d":{"results":[{"Id":"1"}]}}"#).unwrap();
/// assert_eq!(ids[0]["Id"], "1");
/// ```
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    let payload = match unwrap_envelope(body)? {
        Value::Object(mut fields) if fields.contains_key(RESULTS_FIELD) => {
            fields.remove(RESULTS_FIELD).unwrap_or(Value::Null)
        }
        wrapper => wrapper,
    };

    serde_json::from_value(payload)
        .map_err(|e| DecodeError::new(format!("payload does not match target type: {e}"), body))
}

/// Decode a single entity.
pub fn decode_entity<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    decode(body)
}

/// Decode a collection of entities.
pub fn decode_collection<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, DecodeError> {
    decode(body)
}

/// One page of an entity set, with the paging metadata the service sent.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPage<T> {
    /// Entities on this page.
    pub results: Vec<T>,
    /// Total number of entities, present when `$inlinecount=allpages` was requested.
    pub count: Option<u64>,
    /// Link to the next page, for server-side paging.
    pub next: Option<String>,
}

/// Decode a collection together with its `__count` and `__next` metadata.
pub fn decode_page<T: DeserializeOwned>(body: &[u8]) -> Result<EntityPage<T>, DecodeError> {
    let wrapper = unwrap_envelope(body)?;

    let (results, count, next) = match wrapper {
        Value::Object(mut fields) => {
            let count = take_count(&mut fields, body)?;
            let next = match fields.remove("__next") {
                Some(Value::String(link)) => Some(link),
                None | Some(Value::Null) => None,
                Some(other) => {
                    return Err(DecodeError::new(
                        format!("__next is not a string: {other}"),
                        body,
                    ));
                }
            };
            let results = fields.remove(RESULTS_FIELD).ok_or_else(|| {
                DecodeError::new("envelope has no results field", body)
            })?;
            (results, count, next)
        }
        // OData v1 style: the collection directly in `d`.
        array @ Value::Array(_) => (array, None, None),
        other => {
            return Err(DecodeError::new(
                format!("expected a collection, found {}", kind(&other)),
                body,
            ));
        }
    };

    let results = Vec::<T>::deserialize(results)
        .map_err(|e| DecodeError::new(format!("payload does not match target type: {e}"), body))?;

    Ok(EntityPage {
        results,
        count,
        next,
    })
}

fn unwrap_envelope(body: &[u8]) -> Result<Value, DecodeError> {
    let document: Value = serde_json::from_slice(body)
        .map_err(|e| DecodeError::new(format!("invalid JSON: {e}"), body))?;

    match document {
        Value::Object(mut fields) => fields.remove(ENVELOPE_FIELD).ok_or_else(|| {
            DecodeError::new(format!("missing `{ENVELOPE_FIELD}` envelope field"), body)
        }),
        other => Err(DecodeError::new(
            format!("expected a JSON object, found {}", kind(&other)),
            body,
        )),
    }
}

/// `__count` is a string in OData v2 JSON, but some services send a number.
fn take_count(fields: &mut Map<String, Value>, body: &[u8]) -> Result<Option<u64>, DecodeError> {
    match fields.remove("__count") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => s
            .parse()
            .map(Some)
            .map_err(|_| DecodeError::new(format!("__count is not a number: {s}"), body)),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| DecodeError::new(format!("__count is not a count: {n}"), body)),
        Some(other) => Err(DecodeError::new(
            format!("__count has unexpected type {}", kind(&other)),
            body,
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
