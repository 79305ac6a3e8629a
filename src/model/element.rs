//! The top-level element variants.

use super::{Image, Paragraph, Placement, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A renderable unit of document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// A paragraph of text
    Paragraph(Paragraph),
    /// A table
    Table(Table),
    /// A standalone image
    Image(Image),
}

impl Element {
    /// The variant tag.
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Paragraph(_) => ElementKind::Paragraph,
            Element::Table(_) => ElementKind::Table,
            Element::Image(_) => ElementKind::Image,
        }
    }

    /// Alignment and margins of the element.
    pub fn placement(&self) -> &Placement {
        match self {
            Element::Paragraph(p) => &p.style.placement,
            Element::Table(t) => &t.style.placement,
            Element::Image(i) => &i.placement,
        }
    }

    /// Get plain text content of the element.
    pub fn plain_text(&self) -> String {
        match self {
            Element::Paragraph(p) => p.plain_text().to_string(),
            Element::Table(t) => t.plain_text(),
            Element::Image(_) => String::new(),
        }
    }

    /// Check if this is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Element::Paragraph(_))
    }

    /// Check if this is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Element::Table(_))
    }

    /// Check if this is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Element::Image(_))
    }
}

impl From<Paragraph> for Element {
    fn from(p: Paragraph) -> Self {
        Element::Paragraph(p)
    }
}

impl From<Table> for Element {
    fn from(t: Table) -> Self {
        Element::Table(t)
    }
}

impl From<Image> for Element {
    fn from(i: Image) -> Self {
        Element::Image(i)
    }
}

/// Tag of an element variant, keyed by its YAML name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `paragraph`
    Paragraph,
    /// `table`
    Table,
    /// `image`
    Image,
}

impl ElementKind {
    /// All element kinds, in key order.
    pub const ALL: [ElementKind; 3] = [
        ElementKind::Image,
        ElementKind::Paragraph,
        ElementKind::Table,
    ];

    /// The YAML key for this kind.
    pub fn key(self) -> &'static str {
        match self {
            ElementKind::Paragraph => "paragraph",
            ElementKind::Table => "table",
            ElementKind::Image => "image",
        }
    }

    /// Look up a kind by YAML key. Keys are case-sensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
