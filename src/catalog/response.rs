//! Raw catalog responses and their validation.

use std::collections::BTreeMap;

use crate::catalog::CatalogError;
use crate::document::{Document, Element, ElementPath};
use crate::models::{AttributeValue, CatalogItem, CatalogRecord, CONTENT_KEY};

/// A response as it came off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    status: u16,
    body: Vec<u8>,
}

/// An `Error` element embedded in a response payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the transport reported success (HTTP 2xx)
    pub fn is_protocol_valid(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parse the body as XML
    pub fn document(&self) -> Result<Document, CatalogError> {
        Document::parse(&self.body)
    }

    /// Error elements embedded in the payload
    pub fn find_error_elements(&self) -> Result<Vec<ApiErrorDetail>, CatalogError> {
        Ok(error_details(&self.document()?))
    }

    /// Decode every `Item` of a search response. Items that cannot be decoded
    /// are reported individually so callers can skip them.
    pub fn items(&self) -> Result<Vec<Result<CatalogItem, CatalogError>>, CatalogError> {
        Ok(catalog_items(&self.document()?))
    }
}

fn error_details(document: &Document) -> Vec<ApiErrorDetail> {
    document
        .descendants_named("Error")
        .into_iter()
        .map(|e| ApiErrorDetail {
            code: e.child_text("Code").unwrap_or_default().to_string(),
            message: e.child_text("Message").unwrap_or_default().to_string(),
        })
        .collect()
}

/// Decode the candidates of an item search, in response order
pub fn catalog_items(document: &Document) -> Vec<Result<CatalogItem, CatalogError>> {
    let path = ElementPath::new().child("Items").child("Item");
    document.select(&path).into_iter().map(catalog_item).collect()
}

fn catalog_item(item: &Element) -> Result<CatalogItem, CatalogError> {
    let asin = item
        .child_text("ASIN")
        .map(str::trim)
        .filter(|asin| !asin.is_empty())
        .ok_or_else(|| CatalogError::Parse("item without ASIN".to_string()))?;

    let attributes = item
        .child("ItemAttributes")
        .ok_or_else(|| CatalogError::Parse(format!("item {} without ItemAttributes", asin)))?;

    let attributes = match attribute_value(attributes) {
        AttributeValue::Object(map) => CatalogRecord::from(map),
        _ => CatalogRecord::new(),
    };

    Ok(CatalogItem {
        asin: asin.to_string(),
        attributes,
    })
}

/// Convert an element into the loosely-typed attribute shape.
///
/// A bare element becomes a scalar. An element with attributes or children
/// becomes an object; repeated children collapse into a list and the
/// element's own text is kept under `__content__`.
pub fn attribute_value(element: &Element) -> AttributeValue {
    if element.attributes.is_empty() && element.children.is_empty() {
        return AttributeValue::Scalar(element.text.clone());
    }

    let mut map: BTreeMap<String, AttributeValue> = BTreeMap::new();
    for (key, value) in &element.attributes {
        map.insert(key.clone(), AttributeValue::Scalar(value.clone()));
    }

    let mut grouped: BTreeMap<&str, Vec<AttributeValue>> = BTreeMap::new();
    for child in &element.children {
        grouped
            .entry(child.name.as_str())
            .or_default()
            .push(attribute_value(child));
    }
    for (name, mut values) in grouped {
        let value = if values.len() == 1 {
            values.remove(0)
        } else {
            AttributeValue::List(values)
        };
        map.insert(name.to_string(), value);
    }

    if !element.text.is_empty() {
        map.insert(
            CONTENT_KEY.to_string(),
            AttributeValue::Scalar(element.text.clone()),
        );
    }

    AttributeValue::Object(map)
}

/// Decides whether a response can be trusted.
pub struct ResponseValidator;

impl ResponseValidator {
    /// Valid when the transport succeeded, the body parses, and the payload
    /// carries no `Error` elements and no `IsValid` flag set to false.
    pub fn is_valid(response: &RawResponse) -> bool {
        Self::validate(response).is_some()
    }

    /// The parsed payload of a valid response, `None` otherwise.
    /// Parse failures count as invalid.
    pub fn validate(response: &RawResponse) -> Option<Document> {
        if !response.is_protocol_valid() {
            tracing::debug!("Response failed at protocol level: HTTP {}", response.status());
            return None;
        }

        let document = match response.document() {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!("Response body could not be parsed: {}", e);
                return None;
            }
        };

        let errors = error_details(&document);
        if !errors.is_empty() {
            for error in &errors {
                tracing::debug!("Catalog error {}: {}", error.code, error.message);
            }
            return None;
        }

        let flagged_invalid = document
            .select(&ElementPath::new().child("Request").child("IsValid"))
            .iter()
            .any(|flag| flag.text.trim().eq_ignore_ascii_case("false"));
        if flagged_invalid {
            tracing::debug!("Catalog marked the request as invalid");
            return None;
        }

        Some(document)
    }
}
