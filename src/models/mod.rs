//! Core data models for album queries, catalog records and artwork results.

mod album;
mod record;

pub use album::{AlbumArt, AlbumQuery, SizeLabel};
pub use record::{AttributeValue, CatalogItem, CatalogRecord, CONTENT_KEY};
