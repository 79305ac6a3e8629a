//! Rendering result with statistics.

use crate::model::{Document, Element};
use serde::{Deserialize, Serialize};

/// A rendered PDF and what went into it.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// The PDF file content
    pub bytes: Vec<u8>,

    /// Rendering statistics
    pub stats: RenderStats,
}

impl RenderResult {
    /// Size of the PDF in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if no bytes were produced.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Statistics collected during rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Number of pages written
    pub page_count: u32,

    /// Number of paragraphs
    pub paragraph_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of table rows
    pub row_count: u32,

    /// Number of image placements, standalone or in cells
    pub image_count: u32,

    /// Number of distinct image files embedded
    pub embedded_image_count: u32,
}

impl RenderStats {
    /// Count the elements of a document. Page counts are filled in by the
    /// renderer.
    pub fn from_document(doc: &Document) -> Self {
        let mut stats = Self::default();
        for element in doc {
            match element {
                Element::Paragraph(_) => stats.paragraph_count += 1,
                Element::Table(table) => {
                    stats.table_count += 1;
                    stats.row_count += table.row_count() as u32;
                }
                Element::Image(_) => {}
            }
        }
        stats.image_count = doc.images().len() as u32;
        stats
    }
}
