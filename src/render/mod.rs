//! Render adapter: validated [`Document`] to PDF.
//!
//! Rendering happens in three steps. Every image the document refers to is
//! loaded and decoded, the elements are laid out onto pages, and the pages
//! are serialized with `lopdf`. All of it happens in memory, so a failure at
//! any step leaves no output behind.

mod fonts;
mod images;
mod json;
mod layout;
mod options;
mod pdf;
mod result;

pub use json::{to_json, JsonFormat};
pub use options::RenderOptions;
pub use result::{RenderResult, RenderStats};

use crate::error::Result;
use crate::model::Document;
use images::ImageStore;
use pdf::PdfWriter;
use std::io::Write;
use std::path::Path;

/// Render a document to PDF bytes, with statistics.
pub fn render(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    let images = ImageStore::load(doc, options.base_dir())?;
    let pages = layout::layout_document(doc, &images)?;

    let mut writer = PdfWriter::new(&doc.sheet, options);
    writer.begin(&images)?;
    for page in &pages {
        writer.add_page(page)?;
    }
    let mut bytes = Vec::new();
    writer.finish(&doc.metadata, &mut bytes)?;

    let mut stats = RenderStats::from_document(doc);
    stats.page_count = pages.len() as u32;
    stats.embedded_image_count = images.len() as u32;

    log::info!(
        "Rendered {} page(s), {} bytes",
        stats.page_count,
        bytes.len()
    );
    Ok(RenderResult { bytes, stats })
}

/// Render a document to PDF bytes.
pub fn to_pdf(doc: &Document, options: &RenderOptions) -> Result<Vec<u8>> {
    render(doc, options).map(|result| result.bytes)
}

/// Render a document and write the PDF to `writer`.
///
/// Nothing is written unless rendering succeeds.
pub fn write_pdf<W: Write>(
    doc: &Document,
    options: &RenderOptions,
    writer: &mut W,
) -> Result<RenderStats> {
    let result = render(doc, options)?;
    writer.write_all(&result.bytes)?;
    writer.flush()?;
    Ok(result.stats)
}

/// Render a document to a file. The file is only created once rendering
/// has succeeded.
pub fn render_to_file<P: AsRef<Path>>(
    doc: &Document,
    path: P,
    options: &RenderOptions,
) -> Result<RenderStats> {
    let path = path.as_ref();
    let result = render(doc, options)?;
    std::fs::write(path, &result.bytes)?;
    log::info!("Wrote {}", path.display());
    Ok(result.stats)
}
