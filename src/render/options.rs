//! Rendering options and configuration.

use std::path::{Path, PathBuf};

/// Options for rendering a document to PDF.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Directory that relative image `resource` paths resolve against
    /// (the working directory when unset)
    pub base_dir: Option<PathBuf>,

    /// Flate-compress content and image streams
    pub compress: bool,

    /// Write a creation date to the document information dictionary
    pub creation_date: bool,

    /// PDF version written in the file header
    pub pdf_version: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base directory for image resources.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Enable or disable the creation date. Without it, output is
    /// byte-for-byte reproducible.
    pub fn with_creation_date(mut self, enabled: bool) -> Self {
        self.creation_date = enabled;
        self
    }

    /// Set the PDF version.
    pub fn with_pdf_version(mut self, version: impl Into<String>) -> Self {
        self.pdf_version = version.into();
        self
    }

    pub(crate) fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            compress: true,
            creation_date: true,
            pdf_version: "1.7".to_string(),
        }
    }
}
