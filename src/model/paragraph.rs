//! Paragraph element.

use super::style::{positive, Alignment, Placement};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Font size used when a paragraph does not set one.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// A paragraph of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text content, already substituted
    pub text: String,

    /// Paragraph style
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Create a paragraph, validating its style.
    pub fn new(text: impl Into<String>, style: ParagraphStyle) -> Result<Self> {
        style.validate()?;
        Ok(Self {
            text: text.into(),
            style,
        })
    }

    /// Create a paragraph with the default style.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: ParagraphStyle::default(),
        }
    }

    /// Get the plain text of the paragraph.
    pub fn plain_text(&self) -> &str {
        &self.text
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Line height in points for this paragraph's font size.
    pub fn leading(&self) -> f32 {
        self.style.size * 1.2
    }
}

/// Paragraph styling properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Alignment and margins
    #[serde(flatten)]
    pub placement: Placement,

    /// Font size in points
    pub size: f32,
}

impl ParagraphStyle {
    /// Set the font size.
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Set the alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.placement.alignment = alignment;
        self
    }

    /// Check the size and margins.
    pub fn validate(&self) -> Result<()> {
        positive("size", self.size)?;
        self.placement.validate()
    }
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            size: DEFAULT_FONT_SIZE,
        }
    }
}
