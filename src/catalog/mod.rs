//! Access to the remote product catalog.
//!
//! This module defines the [`CatalogTransport`] trait through which the search
//! session talks to the catalog. A transport takes a complete parameter set,
//! signs and sends it, and hands back the raw response; it knows nothing about
//! albums or matching.
//!
//! Two transports ship with the crate:
//!
//! - [`ProductAdvertisingClient`]: signs requests for the Amazon Product
//!   Advertising API and sends them over HTTP
//! - [`MockTransport`]: replays queued responses and records every request,
//!   for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use album_art::catalog::{Credentials, Locale, ProductAdvertisingClient};
//! use album_art::SearchSession;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("access-key", "secret-key");
//! let client = ProductAdvertisingClient::new(credentials, Locale::Us)?;
//! let session = SearchSession::new(Arc::new(client));
//!
//! if let Some(art) = session.search_album("Phish", "Rift").await? {
//!     println!("{:?}", art.images);
//! }
//! # Ok(())
//! # }
//! ```

mod amazon;
pub mod mock;
mod request;
mod response;

pub use amazon::{Credentials, Locale, ProductAdvertisingClient};
pub use mock::MockTransport;
pub use request::{Operation, RequestParams};
pub use response::{
    attribute_value, catalog_items, ApiErrorDetail, RawResponse, ResponseValidator,
};

use async_trait::async_trait;

/// Sends a fully assembled parameter set to the catalog.
///
/// Implementations own signing and transport. They report HTTP-level failures
/// through [`RawResponse::is_protocol_valid`] and reserve `Err` for requests
/// that never produced a response.
#[async_trait]
pub trait CatalogTransport: Send + Sync + std::fmt::Debug {
    /// Send one request and wait for its response
    async fn send(&self, params: &RequestParams) -> Result<RawResponse, CatalogError>;
}

/// Errors that can occur when talking to the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Caller supplied an unusable argument (empty query field, missing credentials)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Network(err.to_string())
    }
}

impl From<quick_xml::Error> for CatalogError {
    fn from(err: quick_xml::Error) -> Self {
        CatalogError::Parse(format!("XML: {}", err))
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(err: url::ParseError) -> Self {
        CatalogError::InvalidArgument(format!("URL: {}", err))
    }
}
