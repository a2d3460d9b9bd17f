//! Mock transport for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::catalog::{CatalogError, CatalogTransport, RawResponse, RequestParams};

/// A transport that replays queued responses in order and records every
/// request it was asked to send.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<RawResponse, CatalogError>>>,
    requests: Mutex<Vec<RequestParams>>,
}

impl MockTransport {
    /// Create a new mock transport with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn push_response(&self, response: RawResponse) {
        let mut guard = self.responses.lock().unwrap();
        guard.push_back(Ok(response));
    }

    /// Queue a successful XML response.
    pub fn push_xml(&self, xml: &str) {
        self.push_response(RawResponse::new(200, xml));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: CatalogError) {
        let mut guard = self.responses.lock().unwrap();
        guard.push_back(Err(error));
    }

    /// Requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<RequestParams> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogTransport for MockTransport {
    async fn send(&self, params: &RequestParams) -> Result<RawResponse, CatalogError> {
        self.requests.lock().unwrap().push(params.clone());
        let mut guard = self.responses.lock().unwrap();
        guard
            .pop_front()
            .unwrap_or_else(|| Err(CatalogError::Network("no mock response queued".to_string())))
    }
}
