//! Artist and album extraction from catalog records.

use crate::models::{AttributeValue, CatalogRecord};

/// Artist of a catalog record, or an empty string.
///
/// Precedence: first entry of a list-valued `Artist`, a single `Artist`,
/// `Author`, every `Creator` joined with " and ", a single `Creator`.
pub fn extract_artist(record: &CatalogRecord) -> String {
    match record.get("Artist") {
        Some(AttributeValue::List(artists)) => {
            return payload(artists.first());
        }
        Some(artist) => {
            if let Some(text) = artist.text() {
                return text.to_string();
            }
        }
        None => {}
    }

    if let Some(author) = record.get("Author").and_then(AttributeValue::first_text) {
        return author.to_string();
    }

    match record.get("Creator") {
        Some(AttributeValue::List(creators)) => creators
            .iter()
            .filter_map(AttributeValue::text)
            .collect::<Vec<_>>()
            .join(" and "),
        Some(creator) => creator.text().unwrap_or_default().to_string(),
        None => String::new(),
    }
}

/// Album title of a catalog record, or an empty string
pub fn extract_album(record: &CatalogRecord) -> String {
    payload(record.get("Title"))
}

fn payload(value: Option<&AttributeValue>) -> String {
    value
        .and_then(AttributeValue::first_text)
        .unwrap_or_default()
        .to_string()
}
