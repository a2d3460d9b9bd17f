//! # Album Art
//!
//! A client for finding album artwork in the Amazon Product Advertising
//! catalog by artist and album title.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`session`]: The two-phase search (item search, then image lookup)
//! - [`catalog`]: Transport trait, request signing, response validation
//! - [`document`]: XML element tree and path selectors
//! - [`extract`]: Artist, album and image URL extraction
//! - [`models`]: Core data structures (AlbumQuery, AlbumArt, CatalogRecord)
//! - [`utils`]: HTTP client and fuzzy name matching
//! - [`config`]: Configuration management

pub mod catalog;
pub mod config;
pub mod document;
pub mod extract;
pub mod models;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use catalog::{CatalogError, CatalogTransport};
pub use models::{AlbumArt, AlbumQuery, SizeLabel};
pub use session::{LookupFailurePolicy, SearchSession};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
