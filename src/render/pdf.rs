//! PDF serialization with `lopdf`.
//!
//! The writer builds the whole object graph in memory: one shared resource
//! dictionary (the two standard fonts and every image XObject), one content
//! stream per page, the page tree, the catalog and the information
//! dictionary.

use super::fonts::{encode_win_ansi, Font};
use super::images::ImageStore;
use super::layout::{DrawOp, PageLayout};
use super::options::RenderOptions;
use crate::error::Result;
use crate::model::{Color, Metadata, Sheet};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId, Stream, StringFormat};
use std::io::Write;

/// Width of table rules in points.
const RULE_WIDTH: f32 = 0.5;

pub(crate) struct PdfWriter<'a> {
    document: LopdfDocument,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    page_size: (f32, f32),
    options: &'a RenderOptions,
}

impl<'a> PdfWriter<'a> {
    pub(crate) fn new(sheet: &Sheet, options: &'a RenderOptions) -> Self {
        let mut document = LopdfDocument::with_version(options.pdf_version.as_str());
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();
        Self {
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            page_size: sheet.dimensions(),
            options,
        }
    }

    /// Write fonts, images, the page tree root and the catalog.
    pub(crate) fn begin(&mut self, images: &ImageStore) -> Result<()> {
        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let font_id = self.document.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }

        let mut xobjects = Dictionary::new();
        for image in images.iter() {
            let dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            };
            let stream = self.stream(dict, image.rgb.clone())?;
            let image_id = self.document.add_object(stream);
            xobjects.set(image.name.as_str(), image_id);
        }

        let mut resources = dictionary! { "Font" => fonts };
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }
        self.document
            .objects
            .insert(self.resources_id, Object::Dictionary(resources));

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![],
            "Count" => 0,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);
        Ok(())
    }

    pub(crate) fn add_page(&mut self, page: &PageLayout) -> Result<()> {
        let mut ctx = PageContext::default();
        for op in &page.ops {
            ctx.draw(op);
        }

        let content = ctx.finish().encode()?;
        let stream = self.stream(Dictionary::new(), content)?;
        let content_id = self.document.add_object(stream);

        let (width, height) = self.page_size;
        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Complete the page tree and information dictionary, then serialize.
    pub(crate) fn finish<W: Write>(mut self, metadata: &Metadata, writer: &mut W) -> Result<()> {
        if let Some(Object::Dictionary(pages_dict)) = self.document.objects.get_mut(&self.pages_id) {
            let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
            pages_dict.set("Kids", kids);
            pages_dict.set("Count", self.page_ids.len() as i64);
        }

        let info = self.info_dictionary(metadata);
        let info_id = self.document.add_object(info);
        self.document.trailer.set("Info", info_id);

        self.document.save_to(writer)?;
        Ok(())
    }

    fn info_dictionary(&self, metadata: &Metadata) -> Dictionary {
        let mut info = dictionary! {
            "Producer" => text_string(&format!("pdfgen {}", env!("CARGO_PKG_VERSION"))),
        };
        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }
        if self.options.creation_date {
            let now = chrono::Utc::now();
            info.set(
                "CreationDate",
                text_string(&now.format("D:%Y%m%d%H%M%SZ").to_string()),
            );
        }
        info
    }

    fn stream(&self, mut dict: Dictionary, data: Vec<u8>) -> Result<Stream> {
        if !self.options.compress {
            return Ok(Stream::new(dict, data));
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data)?;
        let compressed = encoder.finish()?;
        dict.set("Filter", "FlateDecode");
        Ok(Stream::new(dict, compressed))
    }
}

fn text_string(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Literal)
}

/// Content stream of one page, with the graphics state it has set so far.
#[derive(Default)]
struct PageContext {
    operations: Vec<Operation>,
    fill_color: Option<Color>,
    line_width: Option<f32>,
}

impl PageContext {
    fn finish(self) -> Content {
        Content {
            operations: self.operations,
        }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn draw(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Text {
                x,
                y,
                font,
                size,
                text,
            } => {
                self.set_fill_color(Color::BLACK);
                self.push("BT", vec![]);
                self.push("Tf", vec![font.resource_name().into(), (*size).into()]);
                self.push("Td", vec![(*x).into(), (*y).into()]);
                self.push(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                );
                self.push("ET", vec![]);
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                self.set_fill_color(*color);
                self.push(
                    "re",
                    vec![(*x).into(), (*y).into(), (*width).into(), (*height).into()],
                );
                self.push("f", vec![]);
            }
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
            } => {
                self.set_line_width(RULE_WIDTH);
                self.push(
                    "re",
                    vec![(*x).into(), (*y).into(), (*width).into(), (*height).into()],
                );
                self.push("S", vec![]);
            }
            DrawOp::Line { from, to } => {
                self.set_line_width(RULE_WIDTH);
                self.push("m", vec![from.0.into(), from.1.into()]);
                self.push("l", vec![to.0.into(), to.1.into()]);
                self.push("S", vec![]);
            }
            DrawOp::Image {
                name,
                x,
                y,
                width,
                height,
            } => {
                self.push("q", vec![]);
                self.push(
                    "cm",
                    vec![
                        (*width).into(),
                        0.into(),
                        0.into(),
                        (*height).into(),
                        (*x).into(),
                        (*y).into(),
                    ],
                );
                self.push("Do", vec![name.as_str().into()]);
                self.push("Q", vec![]);
            }
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.fill_color != Some(color) {
            let [r, g, b] = color.to_unit();
            self.push("rg", vec![r.into(), g.into(), b.into()]);
            self.fill_color = Some(color);
        }
    }

    fn set_line_width(&mut self, width: f32) {
        if self.line_width != Some(width) {
            self.push("w", vec![width.into()]);
            self.line_width = Some(width);
        }
    }
}
