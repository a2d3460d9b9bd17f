//! Two-phase album artwork search.
//!
//! A search first runs an `ItemSearch` for the artist and album, walks the
//! candidates in the order the catalog returned them and accepts the first
//! whose artist and album both match the query. It then runs an `ItemLookup`
//! for that candidate's images.
//!
//! Every request gets its own freshly built [`RequestParams`], so a session
//! holds no per-search state and can be shared between tasks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{
    catalog_items, CatalogError, CatalogTransport, ProductAdvertisingClient, RequestParams,
    ResponseValidator,
};
use crate::config::Config;
use crate::document::Document;
use crate::extract::{extract_album, extract_artist, extract_images};
use crate::models::{AlbumArt, AlbumQuery, CatalogItem, SizeLabel};
use crate::utils::{matches_with_tolerance, HttpClient, DEFAULT_TOLERANCE};

/// What a search returns when the album matched but the image lookup failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailurePolicy {
    /// Report no result, as if nothing matched
    #[default]
    Discard,
    /// Report the match with every requested size mapped to an empty URL
    KeepMatch,
}

/// Searches the catalog for album artwork
#[derive(Debug, Clone)]
pub struct SearchSession {
    transport: Arc<dyn CatalogTransport>,
    tolerance: usize,
    lookup_policy: LookupFailurePolicy,
}

impl SearchSession {
    /// Create a session over any transport
    pub fn new(transport: Arc<dyn CatalogTransport>) -> Self {
        Self {
            transport,
            tolerance: DEFAULT_TOLERANCE,
            lookup_policy: LookupFailurePolicy::default(),
        }
    }

    /// Create a session that talks to the Product Advertising API.
    /// Fails when the configured credentials are incomplete.
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        let http = HttpClient::with_settings(&config.http)?;
        let client = ProductAdvertisingClient::with_client(
            http,
            config.credentials.clone(),
            &config.locale.endpoint(),
        )?;

        Ok(Self::new(Arc::new(client))
            .tolerance(config.matching.tolerance)
            .lookup_policy(config.lookup.on_failure))
    }

    /// Set the edit distance tolerance used for matching
    pub fn tolerance(mut self, tolerance: usize) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the behavior when the image lookup fails after a match
    pub fn lookup_policy(mut self, policy: LookupFailurePolicy) -> Self {
        self.lookup_policy = policy;
        self
    }

    /// Search with all image sizes
    pub async fn search_album(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<AlbumArt>, CatalogError> {
        self.search(&AlbumQuery::new(artist, album)?).await
    }

    /// Search with a chosen set of image sizes
    pub async fn search_sizes(
        &self,
        artist: &str,
        album: &str,
        sizes: &[SizeLabel],
    ) -> Result<Option<AlbumArt>, CatalogError> {
        let query = AlbumQuery::new(artist, album)?.sizes(sizes.iter().copied());
        self.search(&query).await
    }

    /// Find artwork for an album.
    ///
    /// Returns `Err` only for an invalid query. Transport failures, invalid
    /// responses and the absence of a matching candidate all yield `Ok(None)`.
    pub async fn search(&self, query: &AlbumQuery) -> Result<Option<AlbumArt>, CatalogError> {
        query.validate()?;

        let params = RequestParams::item_search(&query.artist, &query.album);
        let Some(results) = self.fetch(&params).await else {
            tracing::warn!(
                "Item search for '{}' by '{}' failed",
                query.album,
                query.artist
            );
            return Ok(None);
        };

        for candidate in catalog_items(&results) {
            let item = match candidate {
                Ok(item) => item,
                Err(e) => {
                    tracing::debug!("Skipping malformed candidate: {}", e);
                    continue;
                }
            };

            let Some((artist, album)) = self.accept(query, &item) else {
                continue;
            };

            tracing::info!(
                "Matched '{}' by '{}' as {} ('{}' by '{}')",
                query.album,
                query.artist,
                item.asin,
                album,
                artist
            );

            return Ok(self.lookup_images(query, &item, artist, album).await);
        }

        tracing::info!(
            "No catalog entry matched '{}' by '{}'",
            query.album,
            query.artist
        );
        Ok(None)
    }

    /// The candidate's artist and album when both match the query
    fn accept(&self, query: &AlbumQuery, item: &CatalogItem) -> Option<(String, String)> {
        let artist = extract_artist(&item.attributes);
        let album = extract_album(&item.attributes);

        if artist.is_empty() || album.is_empty() {
            tracing::debug!("Skipping {}: missing artist or album", item.asin);
            return None;
        }

        if !matches_with_tolerance(&query.album, &album, self.tolerance)
            || !matches_with_tolerance(&query.artist, &artist, self.tolerance)
        {
            tracing::debug!(
                "Skipping {}: '{}' by '{}' does not match",
                item.asin,
                album,
                artist
            );
            return None;
        }

        Some((artist, album))
    }

    async fn lookup_images(
        &self,
        query: &AlbumQuery,
        item: &CatalogItem,
        artist: String,
        album: String,
    ) -> Option<AlbumArt> {
        let params = RequestParams::item_lookup(&item.asin);
        match self.fetch(&params).await {
            Some(document) => {
                let images = extract_images(&document, &query.sizes);
                Some(AlbumArt::new(artist, album, images))
            }
            None => {
                tracing::warn!("Image lookup for {} failed", item.asin);
                match self.lookup_policy {
                    LookupFailurePolicy::Discard => None,
                    LookupFailurePolicy::KeepMatch => {
                        let images: BTreeMap<SizeLabel, String> = query
                            .sizes
                            .iter()
                            .map(|&size| (size, String::new()))
                            .collect();
                        Some(AlbumArt::new(artist, album, images))
                    }
                }
            }
        }
    }

    /// Send a request and return its payload if the response is valid
    async fn fetch(&self, params: &RequestParams) -> Option<Document> {
        match self.transport.send(params).await {
            Ok(response) => ResponseValidator::validate(&response),
            Err(e) => {
                tracing::warn!("Catalog request failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MockTransport, RawResponse};

    const SEARCH: &str = r#"<ItemSearchResponse><Items>
        <Request><IsValid>True</IsValid></Request>
        <Item><ASIN>B1</ASIN><ItemAttributes>
            <Artist>Phish</Artist><Title>Rift</Title>
        </ItemAttributes></Item>
    </Items></ItemSearchResponse>"#;

    const LOOKUP: &str = r#"<ItemLookupResponse><Items><Item><ASIN>B1</ASIN>
        <ImageSets><ImageSet Category="primary">
            <MediumImage><URL>http://example.com/medium.jpg</URL></MediumImage>
        </ImageSet></ImageSets>
    </Item></Items></ItemLookupResponse>"#;

    fn session(transport: &Arc<MockTransport>) -> SearchSession {
        SearchSession::new(transport.clone())
    }

    #[tokio::test]
    async fn test_search_and_lookup() {
        let transport = Arc::new(MockTransport::new());
        transport.push_xml(SEARCH);
        transport.push_xml(LOOKUP);

        let art = session(&transport)
            .search_sizes("phish", "rift", &[SizeLabel::Medium])
            .await
            .unwrap()
            .unwrap();

        assert_eq!(art.artist, "Phish");
        assert_eq!(art.album, "Rift");
        assert_eq!(art.image(SizeLabel::Medium), Some("http://example.com/medium.jpg"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].get("ItemId"), Some("B1"));
    }

    #[tokio::test]
    async fn test_empty_query_sends_nothing() {
        let transport = Arc::new(MockTransport::new());
        let session = session(&transport);

        let query = AlbumQuery {
            artist: String::new(),
            album: "Rift".to_string(),
            sizes: SizeLabel::ALL.to_vec(),
        };
        assert!(matches!(
            session.search(&query).await,
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(session.search_album("Phish", "").await.is_err());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_found() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(CatalogError::Network("connection refused".to_string()));

        let result = session(&transport).search_album("phish", "rift").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_lookup_failure_policies() {
        let transport = Arc::new(MockTransport::new());
        transport.push_xml(SEARCH);
        transport.push_response(RawResponse::new(500, "Internal Server Error"));
        let discarded = session(&transport).search_album("phish", "rift").await.unwrap();
        assert!(discarded.is_none());

        transport.push_xml(SEARCH);
        transport.push_response(RawResponse::new(500, "Internal Server Error"));
        let kept = session(&transport)
            .lookup_policy(LookupFailurePolicy::KeepMatch)
            .search_sizes("phish", "rift", &[SizeLabel::Medium, SizeLabel::Large])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.artist, "Phish");
        assert_eq!(kept.images.len(), 2);
        assert!(kept.has_no_images());
    }

    #[tokio::test]
    async fn test_tolerance_applies() {
        let transport = Arc::new(MockTransport::new());
        transport.push_xml(SEARCH);

        // "Phush" / "Raft" are each one edit away
        let strict = session(&transport).tolerance(0);
        assert!(strict.search_album("Phush", "Raft").await.unwrap().is_none());
        assert_eq!(transport.request_count(), 1);
    }
}
