//! In-memory product record, as served by the webservice.
//!
//! Fields are matched on their local name, so `<name>`, `<ps:name>` or a
//! `name` element in the default namespace all count as the same field. A
//! localized field carries one `<language id="…">` child per shop locale.

use crate::SyncError;
use std::borrow::Cow;
use xmltree::{Element, XMLNode};

/// Fields present on read that the write endpoint rejects.
pub const NON_WRITABLE_FIELDS: [&str; 3] = ["manufacturer_name", "quantity", "position_in_category"];

const LANGUAGE_NODE: &str = "language";

#[derive(Debug, Clone)]
pub struct ProductRecord {
    root: Element,
}

impl ProductRecord {
    pub fn parse(xml: &[u8]) -> Result<Self, SyncError> {
        let root = Element::parse(xml).map_err(|e| SyncError::XmlParseError(e.to_string()))?;
        Ok(Self { root })
    }

    pub fn to_xml(&self) -> Result<Vec<u8>, SyncError> {
        let mut buf = Vec::new();
        self.root
            .write(&mut buf)
            .map_err(|e| SyncError::XmlWriteError(e.to_string()))?;
        Ok(buf)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Removes every element named `field` below the root, at any depth.
    /// Returns how many were removed.
    pub fn remove_field(&mut self, field: &str) -> usize {
        remove_descendants(&mut self.root, field)
    }

    pub fn strip_non_writable(&mut self) -> usize {
        NON_WRITABLE_FIELDS
            .iter()
            .map(|field| self.remove_field(field))
            .sum()
    }

    pub fn has_field(&self, field: &str) -> bool {
        let mut found = false;
        visit_fields(&self.root, field, &mut |_| found = true);
        found
    }

    /// Text of the first per-language node of the first `field` element.
    pub fn first_language_text(&self, field: &str) -> Option<String> {
        let mut first = None;
        visit_fields(&self.root, field, &mut |element| {
            if first.is_none() {
                first = language_nodes(element)
                    .next()
                    .map(|lang| lang.get_text().map(Cow::into_owned).unwrap_or_default());
            }
        });
        first
    }

    /// Texts of every per-language node under every `field` element.
    pub fn language_texts(&self, field: &str) -> Vec<String> {
        let mut texts = Vec::new();
        visit_fields(&self.root, field, &mut |element| {
            texts.extend(
                language_nodes(element)
                    .map(|lang| lang.get_text().map(Cow::into_owned).unwrap_or_default()),
            );
        });
        texts
    }

    /// Replaces the text of every per-language node under every `field`
    /// element with `value`. Returns how many nodes were written.
    pub fn set_language_text(&mut self, field: &str, value: &str) -> usize {
        let mut written = 0;
        visit_fields_mut(&mut self.root, field, &mut |element| {
            for child in element.children.iter_mut() {
                if let XMLNode::Element(lang) = child {
                    if lang.name == LANGUAGE_NODE {
                        lang.children = vec![XMLNode::Text(value.to_string())];
                        written += 1;
                    }
                }
            }
        });
        written
    }
}

fn language_nodes(field: &Element) -> impl Iterator<Item = &Element> {
    field.children.iter().filter_map(|child| match child {
        XMLNode::Element(e) if e.name == LANGUAGE_NODE => Some(e),
        _ => None,
    })
}

fn remove_descendants(element: &mut Element, field: &str) -> usize {
    let before = element.children.len();
    element
        .children
        .retain(|child| !matches!(child, XMLNode::Element(e) if e.name == field));
    let mut removed = before - element.children.len();

    for child in element.children.iter_mut() {
        if let XMLNode::Element(e) = child {
            removed += remove_descendants(e, field);
        }
    }
    removed
}

// Document order, matching elements below `element` only.
fn visit_fields<'a, F>(element: &'a Element, field: &str, f: &mut F)
where
    F: FnMut(&'a Element),
{
    for child in &element.children {
        if let XMLNode::Element(e) = child {
            if e.name == field {
                f(e);
            }
            visit_fields(e, field, f);
        }
    }
}

fn visit_fields_mut<F>(element: &mut Element, field: &str, f: &mut F)
where
    F: FnMut(&mut Element),
{
    for child in element.children.iter_mut() {
        if let XMLNode::Element(e) = child {
            if e.name == field {
                f(&mut *e);
            }
            visit_fields_mut(e, field, f);
        }
    }
}
