//! Amazon Product Advertising API transport.
//!
//! Requests are signed with signature version 2: every parameter plus the
//! service, key, version and timestamp is sorted by name, percent-encoded per
//! RFC 3986 and signed with HMAC-SHA256 together with the method, host and path.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::catalog::{CatalogError, CatalogTransport, RawResponse, RequestParams};
use crate::utils::HttpClient;

type HmacSha256 = Hmac<Sha256>;

/// Request path of the XML endpoint
const API_PATH: &str = "/onca/xml";
const API_VERSION: &str = "2011-08-01";
const SERVICE: &str = "AWSECommerceService";

/// API key pair, plus the optional associate tag newer API versions require
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default = "env_access_key")]
    pub access_key: String,

    #[serde(default = "env_secret_key")]
    pub secret_key: String,

    #[serde(default = "env_associate_tag")]
    pub associate_tag: Option<String>,
}

fn env_access_key() -> String {
    std::env::var("AMAZON_ACCESS_KEY_ID").unwrap_or_default()
}

fn env_secret_key() -> String {
    std::env::var("AMAZON_SECRET_ACCESS_KEY").unwrap_or_default()
}

fn env_associate_tag() -> Option<String> {
    std::env::var("AMAZON_ASSOCIATE_TAG").ok()
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            associate_tag: None,
        }
    }

    /// Set the associate tag
    pub fn associate_tag(mut self, tag: impl Into<String>) -> Self {
        self.associate_tag = Some(tag.into());
        self
    }

    /// Read `AMAZON_ACCESS_KEY_ID`, `AMAZON_SECRET_ACCESS_KEY` and `AMAZON_ASSOCIATE_TAG`
    pub fn from_env() -> Self {
        Self {
            access_key: env_access_key(),
            secret_key: env_secret_key(),
            associate_tag: env_associate_tag(),
        }
    }

    /// Both keys must be present
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.access_key.trim().is_empty() {
            return Err(CatalogError::InvalidArgument(
                "access key is required".to_string(),
            ));
        }
        if self.secret_key.trim().is_empty() {
            return Err(CatalogError::InvalidArgument(
                "secret key is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::from_env()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("associate_tag", &self.associate_tag)
            .finish()
    }
}

/// Marketplace whose catalog is searched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Us,
    Uk,
    De,
    Fr,
    Ca,
    Jp,
}

impl Locale {
    pub fn host(&self) -> &'static str {
        match self {
            Locale::Us => "ecs.amazonaws.com",
            Locale::Uk => "ecs.amazonaws.co.uk",
            Locale::De => "ecs.amazonaws.de",
            Locale::Fr => "ecs.amazonaws.fr",
            Locale::Ca => "ecs.amazonaws.ca",
            Locale::Jp => "ecs.amazonaws.jp",
        }
    }

    /// Base URL of the marketplace endpoint
    pub fn endpoint(&self) -> String {
        format!("https://{}", self.host())
    }
}

impl FromStr for Locale {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "us" => Ok(Locale::Us),
            "uk" | "gb" => Ok(Locale::Uk),
            "de" => Ok(Locale::De),
            "fr" => Ok(Locale::Fr),
            "ca" => Ok(Locale::Ca),
            "jp" => Ok(Locale::Jp),
            other => Err(CatalogError::InvalidArgument(format!(
                "Unknown locale: {}",
                other
            ))),
        }
    }
}

/// Signs requests and sends them to a Product Advertising API endpoint
#[derive(Debug, Clone)]
pub struct ProductAdvertisingClient {
    client: HttpClient,
    credentials: Credentials,
    endpoint: Url,
}

impl ProductAdvertisingClient {
    /// Create a client for a marketplace. Fails when either key is missing.
    pub fn new(credentials: Credentials, locale: Locale) -> Result<Self, CatalogError> {
        Self::with_client(HttpClient::new()?, credentials, &locale.endpoint())
    }

    /// Create with a custom HTTP client and endpoint base URL (for testing)
    pub fn with_client(
        client: HttpClient,
        credentials: Credentials,
        endpoint: &str,
    ) -> Result<Self, CatalogError> {
        credentials.validate()?;

        let mut endpoint = Url::parse(endpoint)?;
        if endpoint.host_str().is_none() {
            return Err(CatalogError::InvalidArgument(format!(
                "endpoint has no host: {}",
                endpoint
            )));
        }
        endpoint.set_path(API_PATH);
        endpoint.set_query(None);

        Ok(Self {
            client,
            credentials,
            endpoint,
        })
    }

    /// Host as it appears in the Host header, port included when explicit
    fn host(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Full request URL with authentication parameters and signature
    pub fn signed_url(
        &self,
        params: &RequestParams,
        timestamp: DateTime<Utc>,
    ) -> Result<String, CatalogError> {
        let mut params = params
            .clone()
            .with("Service", SERVICE)
            .with("AWSAccessKeyId", &self.credentials.access_key)
            .with("Version", API_VERSION)
            .with("Timestamp", timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        if let Some(tag) = &self.credentials.associate_tag {
            params = params.with("AssociateTag", tag);
        }

        let query = canonical_query(&params);
        let payload = string_to_sign(&self.host(), self.endpoint.path(), &query);
        let signature = sign(&self.credentials.secret_key, &payload)?;

        Ok(format!(
            "{}?{}&Signature={}",
            self.endpoint,
            query,
            urlencoding::encode(&signature)
        ))
    }
}

#[async_trait]
impl CatalogTransport for ProductAdvertisingClient {
    async fn send(&self, params: &RequestParams) -> Result<RawResponse, CatalogError> {
        let url = self.signed_url(params, Utc::now())?;

        tracing::debug!(
            "Sending {} request to {}",
            params.get("Operation").unwrap_or("unknown"),
            self.endpoint
        );

        let response = self
            .client
            .fetch(&url)
            .await
            .map_err(|e| CatalogError::Network(format!("Failed to reach catalog: {}", e)))?;

        if !response.is_protocol_valid() {
            tracing::warn!("Catalog returned HTTP {}", response.status());
        }

        Ok(response)
    }
}

/// Parameters sorted by name and percent-encoded, joined with `&`
pub fn canonical_query(params: &RequestParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn string_to_sign(host: &str, path: &str, query: &str) -> String {
    format!("GET\n{}\n{}\n{}", host.to_lowercase(), path, query)
}

/// Base64 HMAC-SHA256 of `payload` under `secret`
pub fn sign(secret: &str, payload: &str) -> Result<String, CatalogError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CatalogError::InvalidArgument(format!("signing key: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn client() -> ProductAdvertisingClient {
        ProductAdvertisingClient::with_client(
            HttpClient::new().unwrap(),
            Credentials::new("AKIDEXAMPLE", "secret"),
            "https://ecs.amazonaws.com",
        )
        .unwrap()
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let result = ProductAdvertisingClient::new(Credentials::new("", "secret"), Locale::Us);
        assert!(matches!(result, Err(CatalogError::InvalidArgument(_))));

        let result = ProductAdvertisingClient::new(Credentials::new("key", " "), Locale::Us);
        assert!(matches!(result, Err(CatalogError::InvalidArgument(_))));
    }

    #[test]
    fn test_locale_hosts() {
        assert_eq!(Locale::default(), Locale::Us);
        assert_eq!(Locale::Us.endpoint(), "https://ecs.amazonaws.com");
        assert_eq!("UK".parse::<Locale>().unwrap().host(), "ecs.amazonaws.co.uk");
        assert!("mars".parse::<Locale>().is_err());
    }

    #[test]
    fn test_canonical_query_sorted_and_encoded() {
        let params = RequestParams::new()
            .with("Title", "Rift & Hoist")
            .with("Artist", "Phish")
            .with("AWSAccessKeyId", "AKID");
        assert_eq!(
            canonical_query(&params),
            "AWSAccessKeyId=AKID&Artist=Phish&Title=Rift%20%26%20Hoist"
        );
    }

    #[test]
    fn test_sign_known_vector() {
        let signature = sign("key", "The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(signature, "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg=");
    }

    #[test]
    fn test_signed_url_layout() {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let url = client()
            .signed_url(&RequestParams::item_search("phish", "rift"), timestamp)
            .unwrap();

        assert!(url.starts_with("https://ecs.amazonaws.com/onca/xml?AWSAccessKeyId=AKIDEXAMPLE&"));
        assert!(url.contains("&Operation=ItemSearch&"));
        assert!(url.contains("&Service=AWSECommerceService&"));
        assert!(url.contains("&Timestamp=2024-01-02T03%3A04%3A05Z&"));
        assert!(url.contains("&Version=2011-08-01&Signature="));
        assert!(!url.contains("AssociateTag"));
    }

    #[test]
    fn test_signature_covers_canonical_request() {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let params = RequestParams::item_lookup("B000002MSP");
        let url = client().signed_url(&params, timestamp).unwrap();

        let (unsigned, signature) = url.split_once("&Signature=").unwrap();
        let query = unsigned.split_once('?').unwrap().1;
        let expected = sign(
            "secret",
            &format!("GET\necs.amazonaws.com\n/onca/xml\n{}", query),
        )
        .unwrap();

        assert_eq!(urlencoding::decode(signature).unwrap(), expected);
    }

    #[test]
    fn test_associate_tag_is_signed() {
        let client = ProductAdvertisingClient::with_client(
            HttpClient::new().unwrap(),
            Credentials::new("AKIDEXAMPLE", "secret").associate_tag("tag-20"),
            "https://ecs.amazonaws.com",
        )
        .unwrap();
        let url = client
            .signed_url(&RequestParams::item_lookup("B1"), Utc::now())
            .unwrap();
        assert!(url.contains("AssociateTag=tag-20&"));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let debug = format!("{:?}", Credentials::new("AKID", "super-secret"));
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("super-secret"));
    }
}
