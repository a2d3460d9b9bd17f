//! Album query and artwork result models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogError;

/// Image sizes offered by the catalog for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeLabel {
    Swatch,
    Small,
    Thumbnail,
    Tiny,
    Medium,
    Large,
}

impl SizeLabel {
    /// Every size, in the order results are reported
    pub const ALL: [SizeLabel; 6] = [
        SizeLabel::Swatch,
        SizeLabel::Small,
        SizeLabel::Thumbnail,
        SizeLabel::Tiny,
        SizeLabel::Medium,
        SizeLabel::Large,
    ];

    /// Lowercase label, as used in configuration and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeLabel::Swatch => "swatch",
            SizeLabel::Small => "small",
            SizeLabel::Thumbnail => "thumbnail",
            SizeLabel::Tiny => "tiny",
            SizeLabel::Medium => "medium",
            SizeLabel::Large => "large",
        }
    }

    /// Name of the element holding this size inside an image set (e.g. `MediumImage`)
    pub fn element_name(&self) -> &'static str {
        match self {
            SizeLabel::Swatch => "SwatchImage",
            SizeLabel::Small => "SmallImage",
            SizeLabel::Thumbnail => "ThumbnailImage",
            SizeLabel::Tiny => "TinyImage",
            SizeLabel::Medium => "MediumImage",
            SizeLabel::Large => "LargeImage",
        }
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeLabel {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        SizeLabel::ALL
            .into_iter()
            .find(|size| size.as_str() == label)
            .ok_or_else(|| CatalogError::InvalidArgument(format!("Unknown image size: {}", s)))
    }
}

/// An artwork lookup for one album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumQuery {
    /// Artist name as given by the caller
    pub artist: String,

    /// Album title as given by the caller
    pub album: String,

    /// Sizes to resolve, without duplicates
    pub sizes: Vec<SizeLabel>,
}

impl AlbumQuery {
    /// Create a query for all image sizes
    pub fn new(artist: impl Into<String>, album: impl Into<String>) -> Result<Self, CatalogError> {
        let query = Self {
            artist: artist.into(),
            album: album.into(),
            sizes: SizeLabel::ALL.to_vec(),
        };
        query.validate()?;
        Ok(query)
    }

    /// Restrict the query to the given sizes. Repeated sizes keep their first position.
    pub fn sizes(mut self, sizes: impl IntoIterator<Item = SizeLabel>) -> Self {
        let mut unique = Vec::new();
        for size in sizes {
            if !unique.contains(&size) {
                unique.push(size);
            }
        }
        self.sizes = unique;
        self
    }

    /// Check that both artist and album are present
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.artist.trim().is_empty() {
            return Err(CatalogError::InvalidArgument(
                "artist must not be empty".to_string(),
            ));
        }
        if self.album.trim().is_empty() {
            return Err(CatalogError::InvalidArgument(
                "album must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Artwork found for an album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumArt {
    /// Artist name as reported by the catalog
    pub artist: String,

    /// Album title as reported by the catalog
    pub album: String,

    /// One URL per requested size; empty when the catalog had none
    pub images: BTreeMap<SizeLabel, String>,
}

impl AlbumArt {
    pub fn new(
        artist: impl Into<String>,
        album: impl Into<String>,
        images: BTreeMap<SizeLabel, String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            album: album.into(),
            images,
        }
    }

    /// URL for a size, if it was requested and the catalog returned one
    pub fn image(&self, size: SizeLabel) -> Option<&str> {
        self.images
            .get(&size)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    /// Whether no requested size resolved to a URL
    pub fn has_no_images(&self) -> bool {
        self.images.values().all(String::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_label_parse() {
        assert_eq!("medium".parse::<SizeLabel>().unwrap(), SizeLabel::Medium);
        assert_eq!(" Large ".parse::<SizeLabel>().unwrap(), SizeLabel::Large);
        assert!("huge".parse::<SizeLabel>().is_err());
    }

    #[test]
    fn test_size_label_element_name() {
        assert_eq!(SizeLabel::Swatch.element_name(), "SwatchImage");
        assert_eq!(SizeLabel::Thumbnail.element_name(), "ThumbnailImage");
    }

    #[test]
    fn test_query_defaults_to_all_sizes() {
        let query = AlbumQuery::new("Phish", "Rift").unwrap();
        assert_eq!(query.sizes, SizeLabel::ALL.to_vec());
    }

    #[test]
    fn test_query_rejects_empty_fields() {
        assert!(matches!(
            AlbumQuery::new("", "Rift"),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(matches!(
            AlbumQuery::new("Phish", "   "),
            Err(CatalogError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_query_sizes_deduplicated() {
        let query = AlbumQuery::new("Phish", "Rift").unwrap().sizes([
            SizeLabel::Medium,
            SizeLabel::Small,
            SizeLabel::Medium,
        ]);
        assert_eq!(query.sizes, vec![SizeLabel::Medium, SizeLabel::Small]);
    }

    #[test]
    fn test_album_art_image_lookup() {
        let mut images = BTreeMap::new();
        images.insert(SizeLabel::Medium, "http://example.com/m.jpg".to_string());
        images.insert(SizeLabel::Large, String::new());
        let art = AlbumArt::new("Phish", "Rift", images);

        assert_eq!(art.image(SizeLabel::Medium), Some("http://example.com/m.jpg"));
        assert_eq!(art.image(SizeLabel::Large), None);
        assert_eq!(art.image(SizeLabel::Tiny), None);
        assert!(!art.has_no_images());
    }
}
