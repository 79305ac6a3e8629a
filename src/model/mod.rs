//! Document model types.
//!
//! The element tree produced by the builder and consumed by the renderer.
//! Every constructor validates its own fields, so a value of these types is
//! always renderable.

mod document;
mod element;
mod image;
mod paragraph;
mod sheet;
mod style;
mod table;

pub use document::{Document, Metadata};
pub use element::{Element, ElementKind};
pub use image::Image;
pub use paragraph::{Paragraph, ParagraphStyle, DEFAULT_FONT_SIZE};
pub use sheet::{Margins, Orientation, PageSize, Sheet};
pub use style::{Alignment, Color, Placement};
pub use table::{Table, TableCell, TableRow, TableStyle, TextCell};
