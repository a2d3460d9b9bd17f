//! Minimal XML document model with path selection.
//!
//! Catalog responses are small, so they are read into an in-memory element
//! tree with [`quick_xml`] and queried with child-combinator paths such as
//! `Item > ImageSets > ImageSet[Category="primary"] > MediumImage > URL`.
//! The first step may match anywhere in the document; every later step must
//! be a direct child of the previous one. Namespace prefixes are ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogError;

/// One XML element with its attributes, children and direct text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Text directly inside this element, trimmed and concatenated
    pub text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, CatalogError> {
        let mut element = Element::new(String::from_utf8_lossy(start.local_name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| CatalogError::Parse(format!("XML attribute: {}", e)))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| CatalogError::Parse(format!("XML attribute value: {}", e)))?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    /// Value of an attribute, by local name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first direct child with the given name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// This element and everything below it, in document order
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(element) = pending.pop() {
            out.push(element);
            pending.extend(element.children.iter().rev());
        }
        out
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse a complete document. Fails on malformed XML, mismatched tags or
    /// a missing root element.
    pub fn parse(bytes: &[u8]) -> Result<Self, CatalogError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| CatalogError::Parse("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        let text = text
                            .unescape()
                            .map_err(|e| CatalogError::Parse(format!("XML text: {}", e)))?;
                        current.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(CatalogError::Parse(format!(
                "unclosed element <{}>",
                open.name
            )));
        }

        root.map(|root| Document { root })
            .ok_or_else(|| CatalogError::Parse("document has no root element".to_string()))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// All elements with the given name, anywhere in the document
    pub fn descendants_named(&self, name: &str) -> Vec<&Element> {
        self.root
            .descendants()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    /// Elements matching a path, in document order
    pub fn select(&self, path: &ElementPath) -> Vec<&Element> {
        let Some((first, rest)) = path.steps.split_first() else {
            return Vec::new();
        };

        let mut current: Vec<&Element> = self
            .root
            .descendants()
            .into_iter()
            .filter(|e| first.matches(e))
            .collect();

        for step in rest {
            current = current
                .into_iter()
                .flat_map(|e| e.children.iter().filter(move |c| step.matches(c)))
                .collect();
        }

        current
    }

    /// Text of the first element matching a path
    pub fn select_text(&self, path: &ElementPath) -> Option<&str> {
        self.select(path).first().map(|e| e.text.as_str())
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), CatalogError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(CatalogError::Parse("multiple root elements".to_string()))
    }
}

/// One step of an [`ElementPath`]: an element name and an optional attribute test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    name: String,
    attribute: Option<(String, String)>,
}

impl PathStep {
    fn matches(&self, element: &Element) -> bool {
        element.name == self.name
            && match &self.attribute {
                Some((key, value)) => element.attribute(key) == Some(value.as_str()),
                None => true,
            }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some((key, value)) => write!(f, "{}[{}=\"{}\"]", self.name, key, value),
            None => f.write_str(&self.name),
        }
    }
}

/// A child-combinator element path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementPath {
    steps: Vec<PathStep>,
}

impl ElementPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step matching any element with this name
    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PathStep {
            name: name.into(),
            attribute: None,
        });
        self
    }

    /// Append a step matching elements with this name and attribute value
    pub fn child_where(
        mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.steps.push(PathStep {
            name: name.into(),
            attribute: Some((key.into(), value.into())),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self.steps.iter().map(|s| s.to_string()).collect();
        f.write_str(&steps.join(" > "))
    }
}

impl FromStr for ElementPath {
    type Err = CatalogError;

    /// Parse `A > B[key="value"] > C`. `[@key=...]` and single or missing
    /// quotes are also accepted.
    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| CatalogError::InvalidArgument(format!("path '{}': {}", expr, why));
        let mut path = ElementPath::new();

        for raw in expr.split('>') {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(invalid("empty step"));
            }

            path = match raw.split_once('[') {
                None => path.child(raw),
                Some((name, predicate)) => {
                    let predicate = predicate
                        .strip_suffix(']')
                        .ok_or_else(|| invalid("unterminated attribute test"))?;
                    let (key, value) = predicate
                        .split_once('=')
                        .ok_or_else(|| invalid("attribute test without '='"))?;
                    let key = key.trim().trim_start_matches('@');
                    let value = value.trim().trim_matches(|c: char| c == '"' || c == '\'');
                    if name.trim().is_empty() || key.is_empty() {
                        return Err(invalid("missing element or attribute name"));
                    }
                    path.child_where(name.trim(), key, value)
                }
            };
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <Root xmlns="http://example.com/ns">
            <Item>
                <Sets>
                    <Set Category="variant"><Url>http://example.com/variant.jpg</Url></Set>
                    <Set Category="primary"><Url>http://example.com/primary.jpg</Url></Set>
                </Sets>
                <Note><![CDATA[a & b]]></Note>
                <Empty/>
            </Item>
        </Root>"#;

    #[test]
    fn test_parse_tree() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.root().name, "Root");
        let item = doc.root().child("Item").unwrap();
        assert_eq!(item.children.len(), 3);
        assert_eq!(item.child_text("Note"), Some("a & b"));
        assert!(item.child("Empty").is_some());
    }

    #[test]
    fn test_select_with_attribute() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        let path: ElementPath = r#"Item > Sets > Set[Category="primary"] > Url"#.parse().unwrap();
        assert_eq!(doc.select_text(&path), Some("http://example.com/primary.jpg"));

        let all = ElementPath::new().child("Set").child("Url");
        assert_eq!(doc.select(&all).len(), 2);
    }

    #[test]
    fn test_select_missing() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        let path: ElementPath = "Item > Sets > Set[@Category='swatch'] > Url".parse().unwrap();
        assert!(doc.select(&path).is_empty());
        assert_eq!(doc.select_text(&path), None);
    }

    #[test]
    fn test_child_steps_are_direct() {
        let doc = Document::parse(SAMPLE.as_bytes()).unwrap();
        // Url is not a direct child of Item
        let path = ElementPath::new().child("Item").child("Url");
        assert!(doc.select(&path).is_empty());
    }

    #[test]
    fn test_path_display_round_trip() {
        let path = ElementPath::new()
            .child("Item")
            .child_where("ImageSet", "Category", "primary");
        assert_eq!(path.to_string(), r#"Item > ImageSet[Category="primary"]"#);
        assert_eq!(path.to_string().parse::<ElementPath>().unwrap(), path);
    }

    #[test]
    fn test_path_parse_errors() {
        assert!("Item >  > Url".parse::<ElementPath>().is_err());
        assert!("Item[Category".parse::<ElementPath>().is_err());
        assert!("Item[Category]".parse::<ElementPath>().is_err());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Document::parse(b"<a><b></a>").is_err());
        assert!(Document::parse(b"<a>").is_err());
        assert!(Document::parse(b"").is_err());
        assert!(Document::parse(b"not xml at all").is_err());
    }
}
