//! # pdfgen
//!
//! Generate print-ready PDF documents from declarative YAML.
//!
//! A document is a list of paragraphs, tables and images. Text fields may
//! contain `<name>` placeholders that are replaced from a variable map
//! before the document is validated and rendered.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfgen::{build_str, render, VariableMap};
//!
//! fn main() -> pdfgen::Result<()> {
//!     let yaml = r#"
//! - paragraph:
//!     text: "Incubator - UDI (S/N: <serial_number>)"
//!     size: 14
//!     alignment: center
//! - table:
//!     header: true
//!     border: true
//!     rows:
//!       - row: [Part, Lot]
//!       - row: [Sensor, A-113]
//! "#;
//!     let vars = VariableMap::new().with("serial_number", "123456789");
//!     let doc = build_str(yaml, &vars)?;
//!
//!     let pdf = render::to_pdf(&doc, &render::RenderOptions::default())?;
//!     std::fs::write("label.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Elements**: paragraphs, tables (header, border, grid, cell colours,
//!   image cells) and images
//! - **Variables**: best-effort `<name>` substitution in text fields
//! - **Strict validation**: unknown elements and bad attributes fail before
//!   anything is rendered
//! - **Automatic pagination**: paragraphs break between lines, tables
//!   between rows, with repeated header rows

pub mod builder;
pub mod error;
pub mod model;
pub mod render;
pub mod variables;

// Re-export commonly used types
pub use builder::{BuildOptions, DocumentBuilder};
pub use error::{Error, Result};
pub use model::{
    Alignment, Color, Document, Element, ElementKind, Image, Margins, Metadata, Orientation,
    PageSize, Paragraph, ParagraphStyle, Placement, Sheet, Table, TableCell, TableRow,
    TableStyle, TextCell,
};
pub use render::{JsonFormat, RenderOptions, RenderResult, RenderStats};
pub use variables::{load_variables, VariableMap};

use std::io::Read;
use std::path::{Path, PathBuf};

/// File name used when no output path is given.
pub const DEFAULT_OUTPUT_NAME: &str = "generated.pdf";

/// Build a document from YAML text.
///
/// # Example
///
/// ```
/// use pdfgen::{build_str, VariableMap};
///
/// let vars = VariableMap::new().with("name", "World");
/// let doc = build_str("- paragraph: Hello <name>", &vars).unwrap();
/// assert_eq!(doc.plain_text(), "Hello World");
/// ```
pub fn build_str(yaml: &str, variables: &VariableMap) -> Result<Document> {
    builder_for(variables).build_str(yaml)
}

/// Build a document from a YAML file.
pub fn build_file<P: AsRef<Path>>(path: P, variables: &VariableMap) -> Result<Document> {
    builder_for(variables).build_file(path)
}

/// Build a document from a reader.
pub fn build_reader<R: Read>(reader: R, variables: &VariableMap) -> Result<Document> {
    builder_for(variables).build_reader(reader)
}

fn builder_for(variables: &VariableMap) -> DocumentBuilder {
    DocumentBuilder::with_options(BuildOptions::new().with_variables(variables.clone()))
}

/// Build a YAML file and render it to `output`.
///
/// Relative image paths resolve against the directory of `input`. The
/// output file is only written when the whole document renders.
///
/// # Example
///
/// ```no_run
/// use pdfgen::{generate_file, VariableMap};
///
/// let vars = VariableMap::new().with("serial_number", "123456789");
/// let stats = generate_file("label.yaml", "label.pdf", &vars).unwrap();
/// println!("{} page(s)", stats.page_count);
/// ```
pub fn generate_file<P, Q>(input: P, output: Q, variables: &VariableMap) -> Result<RenderStats>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let doc = build_file(input, variables)?;
    let mut options = RenderOptions::default();
    if let Some(dir) = input.parent().filter(|d| !d.as_os_str().is_empty()) {
        options = options.with_base_dir(dir);
    }
    render::render_to_file(&doc, output, &options)
}

/// The default output path for an input file: `generated.pdf` in the same
/// directory.
///
/// ```
/// use std::path::Path;
///
/// let out = pdfgen::default_output_path(Path::new("labels/label.yaml"));
/// assert_eq!(out, Path::new("labels/generated.pdf"));
/// ```
pub fn default_output_path(input: &Path) -> PathBuf {
    match input.parent() {
        Some(dir) => dir.join(DEFAULT_OUTPUT_NAME),
        None => PathBuf::from(DEFAULT_OUTPUT_NAME),
    }
}

/// Builder for building and rendering documents.
///
/// # Example
///
/// ```no_run
/// use pdfgen::Pdfgen;
///
/// Pdfgen::new()
///     .with_variable("serial_number", "123456789")
///     .with_base_dir("./assets")
///     .build_file("label.yaml")?
///     .write_to_file("label.pdf")?;
/// # Ok::<(), pdfgen::Error>(())
/// ```
pub struct Pdfgen {
    build_options: BuildOptions,
    render_options: RenderOptions,
}

impl Pdfgen {
    /// Create a new Pdfgen builder.
    pub fn new() -> Self {
        Self {
            build_options: BuildOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Set one variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.build_options = self.build_options.with_variable(key, value);
        self
    }

    /// Add every variable of `variables`, replacing earlier values.
    pub fn with_variables(mut self, variables: &VariableMap) -> Self {
        self.build_options.variables.merge(variables);
        self
    }

    /// Ignore the document's own `variables:` section.
    pub fn without_document_variables(mut self) -> Self {
        self.build_options = self.build_options.without_document_variables();
        self
    }

    /// Set the directory image resources resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.render_options = self.render_options.with_base_dir(dir);
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.render_options = self.render_options.with_compression(compress);
        self
    }

    /// Enable or disable the creation date in the output.
    pub fn with_creation_date(mut self, enabled: bool) -> Self {
        self.render_options = self.render_options.with_creation_date(enabled);
        self
    }

    /// Build a document from YAML text.
    pub fn build_str(self, yaml: &str) -> Result<PdfgenResult> {
        let document = DocumentBuilder::with_options(self.build_options).build_str(yaml)?;
        Ok(PdfgenResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Build a document from a YAML file.
    ///
    /// Unless a base directory was set, images resolve against the
    /// directory of the file.
    pub fn build_file<P: AsRef<Path>>(mut self, path: P) -> Result<PdfgenResult> {
        let path = path.as_ref();
        let document = DocumentBuilder::with_options(self.build_options).build_file(path)?;
        if self.render_options.base_dir.is_none() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                self.render_options = self.render_options.with_base_dir(dir);
            }
        }
        Ok(PdfgenResult {
            document,
            render_options: self.render_options,
        })
    }
}

impl Default for Pdfgen {
    fn default() -> Self {
        Self::new()
    }
}

/// A built document, ready to render.
pub struct PdfgenResult {
    /// The validated document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
}

impl PdfgenResult {
    /// Render to PDF bytes.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        render::to_pdf(&self.document, &self.render_options)
    }

    /// Render to PDF bytes, with statistics.
    pub fn render(&self) -> Result<RenderResult> {
        render::render(&self.document, &self.render_options)
    }

    /// Render and write to a file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<RenderStats> {
        render::render_to_file(&self.document, path, &self.render_options)
    }

    /// Convert the document model to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get plain text of all elements.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Get the render options.
    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }
}
