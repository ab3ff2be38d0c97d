//! Authenticated request execution with transparent CSRF token refresh.
//!
//! Every call runs through a small state machine:
//!
//! ```text
//! Idle -> Attached -> Sent -> Classified -> Done
//!                                 |
//!                                 +-> Refreshing -> Retrying -> Attached -> Sent -> Classified -> Done
//! ```
//!
//! `Refreshing` is only reachable from the first attempt, so a call costs at
//! most two request round trips plus one token fetch.

use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use crate::classify::{Classification, classify};
use crate::error::{Error, FetchError, TransportError};
use crate::session::{CsrfCredential, SessionState};
use crate::tokens::CsrfToken;
use crate::traits::{Transport, TransportRequest, TransportResponse};
use crate::types::Method;
use crate::{CSRF_FETCH, CSRF_HEADER};

/// Default path of the token probe: the service root.
pub const DEFAULT_PROBE_PATH: &str = "/";

/// Executes requests against a service, managing its anti-forgery token.
///
/// One executor is meant to be shared (e.g. behind an `Arc`) by every caller
/// talking to the same service, so they share a single cached token.
#[derive(Debug)]
pub struct RequestExecutor<T> {
    transport: T,
    session: SessionState,
    probe_path: String,
}

/// Which dispatch of the request this is. There is never a third.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retry,
}

impl Attempt {
    fn number(self) -> u8 {
        match self {
            Attempt::First => 1,
            Attempt::Retry => 2,
        }
    }
}

/// The caller's request, kept so it can be rebuilt for the retry.
#[derive(Debug)]
struct PendingRequest {
    method: Method,
    url: String,
    body: Option<Vec<u8>>,
    query: BTreeMap<String, String>,
}

impl PendingRequest {
    /// Build the outgoing request with the given credential attached.
    ///
    /// A cached token is attached to every method, not only mutating ones.
    fn attach(&self, credential: &CsrfCredential) -> TransportRequest {
        let mut request = TransportRequest::new(self.method, self.url.clone());
        request.query = self.query.clone();
        request.body = self.body.clone();
        if let Some(token) = credential.token() {
            request
                .headers
                .push((CSRF_HEADER.to_string(), token.as_str().to_string()));
        }
        request.cookies = credential.cookies().to_vec();
        request
    }
}

enum State {
    Idle,
    Attached {
        request: TransportRequest,
        attempt: Attempt,
    },
    Sent {
        response: TransportResponse,
        attempt: Attempt,
    },
    Classified {
        classification: Classification,
        response: TransportResponse,
        attempt: Attempt,
    },
    Refreshing,
    Retrying {
        credential: CsrfCredential,
    },
    Done(Result<TransportResponse, Error>),
}

impl<T: Transport> RequestExecutor<T> {
    /// Create an executor with an empty session.
    pub fn new(transport: T) -> Self {
        Self::with_session(transport, SessionState::new())
    }

    /// Create an executor around an existing session state.
    pub fn with_session(transport: T, session: SessionState) -> Self {
        Self {
            transport,
            session,
            probe_path: DEFAULT_PROBE_PATH.to_string(),
        }
    }

    /// Use a different path for the token probe.
    pub fn with_probe_path(mut self, path: impl Into<String>) -> Self {
        self.probe_path = path.into();
        self
    }

    /// Returns the cached session state.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute a request, refreshing the anti-forgery token and retrying once
    /// if the service rejects it.
    ///
    /// Returns the 2xx response unmodified.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if a dispatch fails; never retried.
    /// - [`Error::Fetch`] if the token could not be refreshed; the retry is
    ///   not attempted.
    /// - [`Error::Service`] for any error status, including a token rejected
    ///   again after the refresh.
    #[instrument(skip(self, body, query), fields(%method, url = %url))]
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        query: BTreeMap<String, String>,
    ) -> Result<TransportResponse, Error> {
        let pending = PendingRequest {
            method,
            url: url.to_string(),
            body,
            query,
        };

        let mut state = State::Idle;
        loop {
            state = match state {
                State::Idle => {
                    let credential = self.session.current().await;
                    State::Attached {
                        request: pending.attach(&credential),
                        attempt: Attempt::First,
                    }
                }
                State::Attached { request, attempt } => {
                    debug!(attempt = attempt.number(), "Dispatching request");
                    match self.transport.send(request).await {
                        Ok(response) => State::Sent { response, attempt },
                        Err(err) => State::Done(Err(err.into())),
                    }
                }
                State::Sent { response, attempt } => State::Classified {
                    classification: classify(pending.method, &response),
                    response,
                    attempt,
                },
                State::Classified {
                    classification,
                    response,
                    attempt,
                } => match (classification, attempt) {
                    (Classification::Success, _) => State::Done(Ok(response)),
                    (Classification::Failed(err), _) => State::Done(Err(err.into())),
                    (Classification::CredentialInvalid(_), Attempt::First) => {
                        warn!(status = response.status, "CSRF token rejected, refreshing");
                        State::Refreshing
                    }
                    (Classification::CredentialInvalid(err), Attempt::Retry) => {
                        warn!(status = response.status, "Refreshed CSRF token rejected");
                        State::Done(Err(err.into()))
                    }
                },
                State::Refreshing => match self.refresh_token().await {
                    Ok(credential) => State::Retrying { credential },
                    Err(err) => State::Done(Err(err.into())),
                },
                State::Retrying { credential } => State::Attached {
                    request: pending.attach(&credential),
                    attempt: Attempt::Retry,
                },
                State::Done(result) => return result,
            };
        }
    }

    /// Fetch a new token and store it in the session, replacing the cached one.
    ///
    /// Runs under the session's write lock; see [`SessionState::refresh`].
    pub async fn refresh_token(&self) -> Result<CsrfCredential, FetchError> {
        self.session.refresh(|| self.fetch_credential()).await
    }

    /// Ask the service for a fresh token.
    ///
    /// Probes with HEAD first and falls back to GET if HEAD fails or
    /// answers with an error status.
    #[instrument(skip(self), fields(path = %self.probe_path))]
    async fn fetch_credential(&self) -> Result<CsrfCredential, FetchError> {
        let response = match self.probe(Method::Head).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                warn!(status = response.status, "HEAD token probe failed, retrying with GET");
                self.probe_with_get().await?
            }
            Err(err) => {
                warn!(error = %err, "HEAD token probe failed, retrying with GET");
                self.probe_with_get().await?
            }
        };

        let token = response
            .header(CSRF_HEADER)
            .filter(|value| !value.is_empty())
            .map(CsrfToken::new)
            .ok_or(FetchError::TokenHeaderMissing)?;

        // Cookies the service deletes must not be sent back.
        let cookies: Vec<_> = response
            .cookies
            .into_iter()
            .filter(|cookie| !cookie.is_removal())
            .collect();

        debug!(cookies = cookies.len(), "Fetched CSRF token");
        Ok(CsrfCredential::new(token, cookies))
    }

    async fn probe_with_get(&self) -> Result<TransportResponse, FetchError> {
        let response = self.probe(Method::Get).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
            });
        }
        Ok(response)
    }

    async fn probe(&self, method: Method) -> Result<TransportResponse, TransportError> {
        let mut request = TransportRequest::new(method, self.probe_path.clone());
        request
            .headers
            .push((CSRF_HEADER.to_string(), CSRF_FETCH.to_string()));
        self.transport.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;

    use super::*;
    use crate::envelope;
    use crate::types::Cookie;

    type Handler =
        Box<dyn Fn(&TransportRequest, usize) -> Result<TransportResponse, TransportError> + Send + Sync>;

    /// In-memory transport answering probes and ordinary requests from
    /// separate scripts. Ordinary requests are numbered from 1.
    struct ScriptedTransport {
        log: Mutex<Vec<TransportRequest>>,
        on_request: Handler,
        on_probe: Handler,
    }

    impl ScriptedTransport {
        fn new(
            on_request: impl Fn(&TransportRequest, usize) -> Result<TransportResponse, TransportError>
            + Send
            + Sync
            + 'static,
            on_probe: impl Fn(&TransportRequest, usize) -> Result<TransportResponse, TransportError>
            + Send
            + Sync
            + 'static,
        ) -> Self {
            Self {
                log: Mutex::new(Vec::new()),
                on_request: Box::new(on_request),
                on_probe: Box::new(on_probe),
            }
        }

        fn dispatches(&self) -> Vec<TransportRequest> {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|r| !is_probe(r))
                .cloned()
                .collect()
        }

        fn probes(&self) -> Vec<TransportRequest> {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|r| is_probe(r))
                .cloned()
                .collect()
        }
    }

    fn is_probe(request: &TransportRequest) -> bool {
        request.header(CSRF_HEADER) == Some(CSRF_FETCH)
    }

    #[async_trait::async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            let mut log = self.log.lock().unwrap();
            log.push(request.clone());
            let probe = is_probe(&request);
            let n = log.iter().filter(|r| is_probe(r) == probe).count();
            drop(log);
            if probe {
                (self.on_probe)(&request, n)
            } else {
                (self.on_request)(&request, n)
            }
        }
    }

    fn token_probe(token: &'static str) -> impl Fn(&TransportRequest, usize) -> Result<TransportResponse, TransportError> {
        move |_, _| {
            Ok(TransportResponse::new(200)
                .with_header(CSRF_HEADER, token)
                .with_cookie(Cookie::new("SESSION", "xyz")))
        }
    }

    fn no_probe(_: &TransportRequest, _: usize) -> Result<TransportResponse, TransportError> {
        panic!("token probe not expected")
    }

    fn cached(token: &str) -> SessionState {
        SessionState::with_credential(CsrfCredential::new(
            CsrfToken::new(token),
            vec![Cookie::new("SESSION", "cached")],
        ))
    }

    fn cookie_header(request: &TransportRequest) -> Option<String> {
        Cookie::header_value(&request.cookies)
    }

    #[tokio::test]
    async fn cached_token_means_single_dispatch() {
        let transport = ScriptedTransport::new(
            |_, _| Ok(TransportResponse::new(201).with_body(r#"{"d":{"Id":"1"}}"#)),
            no_probe,
        );
        let executor = RequestExecutor::with_session(transport, cached("valid"));

        let response = executor
            .execute(Method::Post, "/EntitySet", Some(b"{}".to_vec()), BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, br#"{"d":{"Id":"1"}}"#);

        let dispatches = executor.transport().dispatches();
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].header(CSRF_HEADER), Some("valid"));
        assert_eq!(cookie_header(&dispatches[0]).as_deref(), Some("SESSION=cached"));
        assert_eq!(dispatches[0].body.as_deref(), Some(&b"{}"[..]));
    }

    #[tokio::test]
    async fn rejected_token_is_refreshed_and_retried_once() {
        let transport = ScriptedTransport::new(
            |_, n| {
                if n == 1 {
                    Ok(TransportResponse::new(403).with_header(CSRF_HEADER, "Required"))
                } else {
                    Ok(TransportResponse::new(200))
                }
            },
            token_probe("fresh"),
        );
        let executor = RequestExecutor::with_session(transport, cached("stale"));

        let response = executor
            .execute(Method::Put, "/EntitySet('1')", None, BTreeMap::new())
            .await
            .unwrap();
        assert_eq!(response.status, 200);

        let probes = executor.transport().probes();
        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].method, Method::Head);
        assert_eq!(probes[0].url, "/");

        let dispatches = executor.transport().dispatches();
        assert_eq!(dispatches.len(), 2);
        assert_eq!(dispatches[0].header(CSRF_HEADER), Some("stale"));
        assert_eq!(dispatches[1].header(CSRF_HEADER), Some("fresh"));
        assert_eq!(cookie_header(&dispatches[1]).as_deref(), Some("SESSION=xyz"));
    }

    #[tokio::test]
    async fn never_retries_more_than_once() {
        let transport = ScriptedTransport::new(
            |_, _| Ok(TransportResponse::new(403).with_header(CSRF_HEADER, "Required")),
            token_probe("fresh"),
        );
        let executor = RequestExecutor::new(transport);

        let err = executor
            .execute(Method::Post, "/EntitySet", None, BTreeMap::new())
            .await
            .unwrap_err();

        match err {
            Error::Service(err) => assert_eq!(err.status, 403),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(executor.transport().probes().len(), 1);
        assert_eq!(executor.transport().dispatches().len(), 2);
    }

    #[tokio::test]
    async fn failed_refresh_aborts_without_retry() {
        let transport = ScriptedTransport::new(
            |_, _| Ok(TransportResponse::new(403)),
            |request, _| {
                let status = if request.method == Method::Head { 500 } else { 503 };
                Ok(TransportResponse::new(status))
            },
        );
        let executor = RequestExecutor::with_session(transport, cached("stale"));

        let err = executor
            .execute(Method::Delete, "/EntitySet('1')", None, BTreeMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Fetch(FetchError::Status { status: 503 })));
        assert!(err.to_string().starts_with("failed to refresh credential"));

        let probes = executor.transport().probes();
        assert_eq!(probes.len(), 2);
        assert_eq!(probes[0].method, Method::Head);
        assert_eq!(probes[1].method, Method::Get);
        assert_eq!(executor.transport().dispatches().len(), 1);

        // The stale credential is kept after a failed refresh.
        let current = executor.session().current().await;
        assert_eq!(current.token().map(CsrfToken::as_str), Some("stale"));
    }

    #[tokio::test]
    async fn head_transport_error_falls_back_to_get() {
        let transport = ScriptedTransport::new(
            |_, n| Ok(TransportResponse::new(if n == 1 { 403 } else { 204 })),
            |request, _| {
                if request.method == Method::Head {
                    Err(TransportError::Connection {
                        message: "connection reset".to_string(),
                    })
                } else {
                    Ok(TransportResponse::new(200).with_header(CSRF_HEADER, "from-get"))
                }
            },
        );
        let executor = RequestExecutor::new(transport);

        let response = executor
            .execute(Method::Patch, "/EntitySet('1')", None, BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(response.status, 204);
        let dispatches = executor.transport().dispatches();
        assert_eq!(dispatches[1].header(CSRF_HEADER), Some("from-get"));
    }

    #[tokio::test]
    async fn missing_token_header_is_fatal() {
        let transport = ScriptedTransport::new(
            |_, _| Ok(TransportResponse::new(403)),
            |_, _| Ok(TransportResponse::new(200)),
        );
        let executor = RequestExecutor::new(transport);

        let err = executor
            .execute(Method::Post, "/EntitySet", None, BTreeMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Fetch(FetchError::TokenHeaderMissing)));
        assert_eq!(executor.transport().probes().len(), 1);
        assert_eq!(executor.transport().dispatches().len(), 1);
    }

    #[tokio::test]
    async fn forbidden_read_is_not_retried() {
        let transport = ScriptedTransport::new(|_, _| Ok(TransportResponse::new(403)), no_probe);
        let executor = RequestExecutor::new(transport);

        let err = executor
            .execute(Method::Get, "/EntitySet", None, BTreeMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Service(ref e) if e.status == 403));
        assert_eq!(executor.transport().dispatches().len(), 1);
    }

    #[tokio::test]
    async fn reads_attach_cached_token_opportunistically() {
        let transport = ScriptedTransport::new(|_, _| Ok(TransportResponse::new(200)), no_probe);
        let executor = RequestExecutor::with_session(transport, cached("valid"));

        let mut query = BTreeMap::new();
        query.insert("$top".to_string(), "5".to_string());
        executor
            .execute(Method::Get, "/EntitySet", None, query)
            .await
            .unwrap();

        let dispatches = executor.transport().dispatches();
        assert_eq!(dispatches[0].header(CSRF_HEADER), Some("valid"));
        assert_eq!(dispatches[0].query.get("$top").map(String::as_str), Some("5"));
    }

    #[tokio::test]
    async fn reads_without_token_never_fetch_one() {
        let transport = ScriptedTransport::new(|_, _| Ok(TransportResponse::new(200)), no_probe);
        let executor = RequestExecutor::new(transport);

        executor
            .execute(Method::Get, "/EntitySet", None, BTreeMap::new())
            .await
            .unwrap();

        let dispatches = executor.transport().dispatches();
        assert_eq!(dispatches[0].header(CSRF_HEADER), None);
        assert!(dispatches[0].cookies.is_empty());
    }

    #[tokio::test]
    async fn transport_error_is_returned_immediately() {
        let transport = ScriptedTransport::new(
            |_, _| {
                Err(TransportError::Timeout {
                    message: "deadline elapsed".to_string(),
                })
            },
            no_probe,
        );
        let executor = RequestExecutor::new(transport);

        let err = executor
            .execute(Method::Post, "/EntitySet", None, BTreeMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));
        assert_eq!(executor.transport().dispatches().len(), 1);
    }

    #[tokio::test]
    async fn service_error_is_not_retried() {
        let transport = ScriptedTransport::new(
            |_, _| {
                Ok(TransportResponse::new(400).with_body(
                    r#"{"error":{"code":"MM/001","message":{"lang":"en","value":"Material type missing"}}}"#,
                ))
            },
            no_probe,
        );
        let executor = RequestExecutor::with_session(transport, cached("valid"));

        let err = executor
            .execute(Method::Post, "/MaterialSet", None, BTreeMap::new())
            .await
            .unwrap_err();

        match err {
            Error::Service(err) => {
                assert_eq!(err.code.as_deref(), Some("MM/001"));
                assert_eq!(err.message.as_deref(), Some("Material type missing"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(executor.transport().dispatches().len(), 1);
    }

    #[tokio::test]
    async fn probe_path_is_configurable() {
        let transport = ScriptedTransport::new(
            |_, n| Ok(TransportResponse::new(if n == 1 { 403 } else { 201 })),
            token_probe("fresh"),
        );
        let executor =
            RequestExecutor::new(transport).with_probe_path("/sap/opu/odata/sap/ZSRV/");

        executor
            .execute(Method::Post, "/sap/opu/odata/sap/ZSRV/ItemSet", None, BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(executor.transport().probes()[0].url, "/sap/opu/odata/sap/ZSRV/");
    }

    #[derive(Debug, Deserialize)]
    struct Entity {
        #[serde(rename = "Id")]
        id: String,
    }

    #[tokio::test]
    async fn create_without_cached_token_end_to_end() {
        let transport = ScriptedTransport::new(
            |_, n| {
                if n == 1 {
                    Ok(TransportResponse::new(403))
                } else {
                    Ok(TransportResponse::new(201).with_body(r#"{"d":{"Id":"1"}}"#))
                }
            },
            token_probe("abc123"),
        );
        let executor = RequestExecutor::new(transport);

        let response = executor
            .execute(
                Method::Post,
                "/EntitySet",
                Some(br#"{"Id":"1"}"#.to_vec()),
                BTreeMap::new(),
            )
            .await
            .unwrap();
        let entity: Entity = envelope::decode_entity(&response.body).unwrap();
        assert_eq!(entity.id, "1");

        let dispatches = executor.transport().dispatches();
        assert_eq!(dispatches.len(), 2);
        assert_eq!(dispatches[0].header(CSRF_HEADER), None);
        assert!(dispatches[0].cookies.is_empty());
        assert_eq!(dispatches[1].header(CSRF_HEADER), Some("abc123"));
        assert_eq!(cookie_header(&dispatches[1]).as_deref(), Some("SESSION=xyz"));
        assert_eq!(dispatches[1].body, dispatches[0].body);

        let probes = executor.transport().probes();
        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].method, Method::Head);
        assert_eq!(probes[0].url, "/");
        assert!(probes[0].cookies.is_empty());

        let current = executor.session().current().await;
        assert_eq!(current.token().map(CsrfToken::as_str), Some("abc123"));
        assert_eq!(current.cookies(), &[Cookie::new("SESSION", "xyz")]);
    }

    #[tokio::test]
    async fn deletion_cookies_from_token_fetch_are_not_stored() {
        let transport = ScriptedTransport::new(
            |request, _| match request.header(CSRF_HEADER) {
                Some(_) => Ok(TransportResponse::new(204)),
                None => Ok(TransportResponse::new(403)),
            },
            |_, _| {
                Ok(TransportResponse::new(200)
                    .with_header(CSRF_HEADER, "abc123")
                    .with_cookie(
                        Cookie::parse_set_cookie(
                            "SAP_SESSIONID=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/",
                        )
                        .unwrap(),
                    )
                    .with_cookie(Cookie::parse_set_cookie("MYSAPSSO2=old; Max-Age=0").unwrap())
                    .with_cookie(Cookie::new("SESSION", "xyz")))
            },
        );
        let executor = RequestExecutor::new(transport);

        executor
            .execute(Method::Delete, "/EntitySet('1')", None, BTreeMap::new())
            .await
            .unwrap();

        let dispatches = executor.transport().dispatches();
        assert_eq!(cookie_header(&dispatches[1]).as_deref(), Some("SESSION=xyz"));
        let current = executor.session().current().await;
        assert_eq!(current.cookies(), &[Cookie::new("SESSION", "xyz")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_callers_each_refresh_and_retry_once() {
        use std::collections::BTreeSet;
        use std::sync::{Arc, Barrier};

        const CALLERS: usize = 4;

        // Hold every tokenless first dispatch until all callers have sent one,
        // so none of them can pick up a token another caller fetched.
        let first_dispatches = Arc::new(Barrier::new(CALLERS));
        let transport = ScriptedTransport::new(
            move |request, _| match request.header(CSRF_HEADER) {
                Some(_) => Ok(TransportResponse::new(201)),
                None => {
                    first_dispatches.wait();
                    Ok(TransportResponse::new(403).with_header(CSRF_HEADER, "Required"))
                }
            },
            |_, n| Ok(TransportResponse::new(200).with_header(CSRF_HEADER, format!("token-{n}"))),
        );
        let executor = Arc::new(RequestExecutor::new(transport));

        let handles: Vec<_> = (0..CALLERS)
            .map(|i| {
                let executor = executor.clone();
                tokio::spawn(async move {
                    executor
                        .execute(
                            Method::Post,
                            "/EntitySet",
                            Some(format!(r#"{{"Id":"{i}"}}"#).into_bytes()),
                            BTreeMap::new(),
                        )
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().status, 201);
        }

        // Refreshes are serialized, not shared: one token fetch per caller.
        assert_eq!(executor.transport().probes().len(), CALLERS);

        let dispatches = executor.transport().dispatches();
        assert_eq!(dispatches.len(), 2 * CALLERS);

        let retry_tokens: BTreeSet<_> = dispatches
            .iter()
            .filter_map(|request| request.header(CSRF_HEADER))
            .map(str::to_string)
            .collect();
        let probe_tokens: BTreeSet<_> = (1..=CALLERS).map(|n| format!("token-{n}")).collect();
        assert_eq!(retry_tokens, probe_tokens);

        // Each caller retried its own body with a token nobody else used.
        for i in 0..CALLERS {
            let body = format!(r#"{{"Id":"{i}"}}"#).into_bytes();
            let sent: Vec<_> = dispatches
                .iter()
                .filter(|request| request.body.as_deref() == Some(&body[..]))
                .collect();
            assert_eq!(sent.len(), 2);
            assert_eq!(sent[0].header(CSRF_HEADER), None);
            assert!(sent[1].header(CSRF_HEADER).is_some());
        }
    }
}
