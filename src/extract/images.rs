//! Image URL extraction from item lookup responses.

use std::collections::BTreeMap;

use crate::document::{Document, ElementPath};
use crate::models::SizeLabel;

/// Image set category holding the item's main artwork
pub const PRIMARY_CATEGORY: &str = "primary";

/// `Item > ImageSets > ImageSet[Category="primary"] > {Size}Image > URL`
pub fn image_path(size: SizeLabel) -> ElementPath {
    ElementPath::new()
        .child("Item")
        .child("ImageSets")
        .child_where("ImageSet", "Category", PRIMARY_CATEGORY)
        .child(size.element_name())
        .child("URL")
}

/// One URL per requested size from the primary image set. Sizes the
/// document lacks map to an empty string; sizes not requested are left out.
pub fn extract_images(document: &Document, sizes: &[SizeLabel]) -> BTreeMap<SizeLabel, String> {
    sizes
        .iter()
        .map(|&size| {
            let url = document
                .select_text(&image_path(size))
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
            (size, url)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOKUP: &str = r#"<ItemLookupResponse>
        <Items>
            <Item>
                <ASIN>B000002MSP</ASIN>
                <ImageSets>
                    <ImageSet Category="variant">
                        <MediumImage><URL>http://example.com/variant-medium.jpg</URL></MediumImage>
                    </ImageSet>
                    <ImageSet Category="primary">
                        <SmallImage><URL>http://example.com/small.jpg</URL></SmallImage>
                        <MediumImage><URL>http://example.com/medium.jpg</URL></MediumImage>
                    </ImageSet>
                </ImageSets>
            </Item>
        </Items>
    </ItemLookupResponse>"#;

    fn document() -> Document {
        Document::parse(LOOKUP.as_bytes()).unwrap()
    }

    #[test]
    fn test_image_path_display() {
        assert_eq!(
            image_path(SizeLabel::Medium).to_string(),
            r#"Item > ImageSets > ImageSet[Category="primary"] > MediumImage > URL"#
        );
    }

    #[test]
    fn test_present_sizes_use_primary_set() {
        let images = extract_images(&document(), &[SizeLabel::Small, SizeLabel::Medium]);
        assert_eq!(images[&SizeLabel::Small], "http://example.com/small.jpg");
        assert_eq!(images[&SizeLabel::Medium], "http://example.com/medium.jpg");
    }

    #[test]
    fn test_absent_size_is_empty() {
        let images = extract_images(&document(), &[SizeLabel::Large, SizeLabel::Medium]);
        assert_eq!(images[&SizeLabel::Large], "");
        assert_eq!(images[&SizeLabel::Medium], "http://example.com/medium.jpg");
    }

    #[test]
    fn test_only_requested_sizes() {
        let images = extract_images(&document(), &[SizeLabel::Medium]);
        assert_eq!(images.len(), 1);
        assert!(images.contains_key(&SizeLabel::Medium));

        let all = extract_images(&document(), &SizeLabel::ALL);
        assert_eq!(all.len(), 6);
        assert_eq!(all.values().filter(|url| url.is_empty()).count(), 4);
    }

    #[test]
    fn test_no_sizes_requested() {
        assert!(extract_images(&document(), &[]).is_empty());
    }
}
