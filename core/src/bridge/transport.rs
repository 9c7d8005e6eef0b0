//! Host transports
//!
//! A transport moves one JSON request body to the host and returns the raw
//! response body. The bridge owns encoding, decoding and fallback policy.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use reqwest::header::CONTENT_TYPE;

/// Byte-level request channel to the host
pub trait Transport {
    /// POST `body` to `url` and return the response body.
    ///
    /// `Err` carries a human-readable reason; the bridge attaches the action.
    fn post(&self, url: &str, body: String) -> impl Future<Output = Result<String, String>>;
}

/// HTTP transport for the embedded browser host.
///
/// On wasm32 reqwest compiles down to `fetch`, which is how NUI callbacks
/// reach the game client script.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    async fn post(&self, url: &str, body: String) -> Result<String, String> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .body(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        response.text().await.map_err(|e| e.to_string())
    }
}

/// A request observed by [`LoopbackTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: String,
}

/// In-process transport that records requests and answers with a fixed body.
///
/// Used by the replay harness and tests in place of a live host.
#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    response: Result<String, String>,
    requests: Rc<RefCell<Vec<RecordedRequest>>>,
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::responding("{}")
    }
}

impl LoopbackTransport {
    /// Answer every request with `body`
    pub fn responding(body: impl Into<String>) -> Self {
        Self {
            response: Ok(body.into()),
            requests: Rc::default(),
        }
    }

    /// Fail every request with `reason`, as an unreachable host would
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            response: Err(reason.into()),
            requests: Rc::default(),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    /// Remove and return everything recorded so far
    pub fn take_requests(&self) -> Vec<RecordedRequest> {
        std::mem::take(&mut *self.requests.borrow_mut())
    }
}

impl Transport for LoopbackTransport {
    async fn post(&self, url: &str, body: String) -> Result<String, String> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: url.to_string(),
            body,
        });
        self.response.clone()
    }
}
