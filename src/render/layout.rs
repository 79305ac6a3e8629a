//! Flow layout with automatic pagination.
//!
//! Elements are stacked top to bottom inside the frame (the sheet minus its
//! margins). Paragraphs break between lines, tables between rows and images
//! move to the next page whole. Coordinates are PDF user space: origin at
//! the bottom-left corner, y growing upwards.

use super::fonts::{self, Font};
use super::images::ImageStore;
use crate::error::Result;
use crate::model::{Color, Document, Element, Image, Paragraph, Sheet, Table, TableCell, TableRow};

/// Line height as a multiple of the font size.
pub(crate) const LEADING: f32 = 1.2;
/// Font size of table cells.
pub(crate) const TABLE_FONT_SIZE: f32 = 10.0;
pub(crate) const CELL_PADDING_X: f32 = 6.0;
pub(crate) const CELL_PADDING_Y: f32 = 3.0;
/// Smallest box an image is fitted into, in points.
const MIN_FIT_EXTENT: f32 = 1.0;

/// A positioned drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    /// One line of text; `y` is the baseline
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        text: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
    },
    /// An image XObject; `(x, y)` is the bottom-left corner
    Image {
        name: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// The drawing instructions of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PageLayout {
    pub(crate) ops: Vec<DrawOp>,
}

/// Lay out every element of `doc`. Always yields at least one page.
pub(crate) fn layout_document(doc: &Document, images: &ImageStore) -> Result<Vec<PageLayout>> {
    let mut engine = LayoutEngine::new(&doc.sheet, images);

    for element in doc {
        let placement = element.placement();
        engine.space_before(placement.space_before);
        match element {
            Element::Paragraph(p) => engine.paragraph(p),
            Element::Table(t) => engine.table(t)?,
            Element::Image(i) => engine.image(i)?,
        }
        engine.space_after(placement.space_after);
    }

    let pages = engine.finish();
    log::debug!("Laid out {} page(s)", pages.len());
    Ok(pages)
}

struct LayoutEngine<'a> {
    images: &'a ImageStore,
    left: f32,
    frame_width: f32,
    frame_top: f32,
    frame_bottom: f32,
    pages: Vec<PageLayout>,
    ops: Vec<DrawOp>,
    /// Top of the free space on the current page
    cursor: f32,
    /// Nothing has been placed on the current page yet
    fresh: bool,
}

impl<'a> LayoutEngine<'a> {
    fn new(sheet: &Sheet, images: &'a ImageStore) -> Self {
        let (_, page_height) = sheet.dimensions();
        let frame_top = page_height - sheet.margin.top;
        Self {
            images,
            left: sheet.margin.left,
            frame_width: sheet.frame_width(),
            frame_top,
            frame_bottom: sheet.margin.bottom,
            pages: Vec::new(),
            ops: Vec::new(),
            cursor: frame_top,
            fresh: true,
        }
    }

    fn frame_height(&self) -> f32 {
        self.frame_top - self.frame_bottom
    }

    fn remaining(&self) -> f32 {
        self.cursor - self.frame_bottom
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout {
            ops: std::mem::take(&mut self.ops),
        });
        self.cursor = self.frame_top;
        self.fresh = true;
        log::debug!("Page break, starting page {}", self.pages.len() + 1);
    }

    /// Break the page unless `height` fits. A fresh page takes anything.
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && !self.fresh {
            self.new_page();
        }
    }

    fn advance(&mut self, height: f32) {
        self.cursor -= height;
        self.fresh = false;
    }

    /// Space before is dropped at the top of a page.
    fn space_before(&mut self, amount: f32) {
        if self.fresh || amount <= 0.0 {
            return;
        }
        if amount >= self.remaining() {
            self.new_page();
        } else {
            self.cursor -= amount;
        }
    }

    fn space_after(&mut self, amount: f32) {
        self.cursor = (self.cursor - amount).max(self.frame_bottom);
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.pages.push(PageLayout { ops: self.ops });
        self.pages
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        let size = paragraph.style.size;
        let leading = paragraph.leading();
        let alignment = paragraph.style.placement.alignment;
        let text = fonts::normalize(&paragraph.text);

        for line in fonts::wrap_text(&text, Font::Regular, size, self.frame_width) {
            self.ensure(leading);
            if !line.is_empty() {
                let width = Font::Regular.text_width(&line, size);
                self.ops.push(DrawOp::Text {
                    x: self.left + alignment.offset(self.frame_width, width),
                    y: self.cursor - size,
                    font: Font::Regular,
                    size,
                    text: line,
                });
            }
            self.advance(leading);
        }
    }

    fn image(&mut self, image: &Image) -> Result<()> {
        let loaded = self.images.get(&image.resource)?;
        let (natural_width, natural_height) = loaded.natural_size();
        let requested = image.resolve_size(natural_width, natural_height);
        let (width, height) = fit(requested, self.frame_width, self.frame_height());
        if (width, height) != requested {
            log::debug!(
                "Scaled image {} from {}x{} to {}x{} to fit the frame",
                image.resource,
                requested.0,
                requested.1,
                width,
                height
            );
        }

        self.ensure(height);
        self.ops.push(DrawOp::Image {
            name: loaded.name.clone(),
            x: self.left + image.placement.alignment.offset(self.frame_width, width),
            y: self.cursor - height,
            width,
            height,
        });
        self.advance(height);
        Ok(())
    }

    fn table(&mut self, table: &Table) -> Result<()> {
        let widths = self.column_widths(table)?;
        let table_width: f32 = widths.iter().sum();
        let x = self.left + table.style.placement.alignment.offset(self.frame_width, table_width);

        let rows = table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let font = if i == 0 && table.style.header {
                    Font::Bold
                } else {
                    Font::Regular
                };
                self.measure_row(row, &widths, font)
            })
            .collect::<Result<Vec<_>>>()?;

        let grid = TableGrid {
            x,
            widths: &widths,
            border: table.style.border,
            inner: table.style.grid,
        };
        let mut segment: Option<Segment> = None;

        for (i, row) in rows.iter().enumerate() {
            if row.height > self.remaining() && !self.fresh {
                if let Some(done) = segment.take() {
                    self.close_segment(done, &grid);
                }
                self.new_page();

                if i > 0 && table.style.header {
                    let mut repeated = Segment::new(self.cursor);
                    repeated.row_tops.push(self.cursor);
                    self.draw_row(&rows[0], &grid);
                    segment = Some(repeated);
                }
            }

            if row.height > self.remaining() {
                log::warn!(
                    "Table row {} is taller than the page frame and will be clipped",
                    i
                );
            }

            let current = segment.get_or_insert_with(|| Segment::new(self.cursor));
            current.row_tops.push(self.cursor);
            self.draw_row(row, &grid);
        }

        if let Some(done) = segment {
            self.close_segment(done, &grid);
        }
        Ok(())
    }

    /// Natural column widths, scaled down to the frame when too wide.
    fn column_widths(&self, table: &Table) -> Result<Vec<f32>> {
        let min_width = 2.0 * CELL_PADDING_X + TABLE_FONT_SIZE;
        let mut widths = vec![min_width; table.column_count()];

        for (i, row) in table.rows.iter().enumerate() {
            let font = if i == 0 && table.style.header {
                Font::Bold
            } else {
                Font::Regular
            };
            for (cell, width) in row.cells.iter().zip(widths.iter_mut()) {
                let content = match cell {
                    TableCell::Text(text) => fonts::normalize(&text.text)
                        .split('\n')
                        .map(|line| font.text_width(line, TABLE_FONT_SIZE))
                        .fold(0.0, f32::max),
                    TableCell::Image(image) => {
                        let (natural_width, natural_height) =
                            self.images.get(&image.resource)?.natural_size();
                        image.resolve_size(natural_width, natural_height).0
                    }
                };
                *width = width.max(content + 2.0 * CELL_PADDING_X);
            }
        }

        let total: f32 = widths.iter().sum();
        if total > self.frame_width {
            let scale = self.frame_width / total;
            widths.iter_mut().for_each(|w| *w *= scale);
        }
        Ok(widths)
    }

    fn measure_row(&self, row: &TableRow, widths: &[f32], font: Font) -> Result<MeasuredRow> {
        let line_height = TABLE_FONT_SIZE * LEADING;
        let mut content_height = line_height;
        let mut cells = Vec::with_capacity(row.cells.len());

        for (cell, width) in row.cells.iter().zip(widths) {
            let inner = width - 2.0 * CELL_PADDING_X;
            let measured = match cell {
                TableCell::Text(text) => {
                    let lines = fonts::wrap_text(
                        &fonts::normalize(&text.text),
                        font,
                        TABLE_FONT_SIZE,
                        inner,
                    );
                    content_height = content_height.max(lines.len() as f32 * line_height);
                    MeasuredCell::Text {
                        lines,
                        background: text.background_color,
                    }
                }
                TableCell::Image(image) => {
                    let loaded = self.images.get(&image.resource)?;
                    let (natural_width, natural_height) = loaded.natural_size();
                    let requested = image.resolve_size(natural_width, natural_height);
                    let (width, height) = fit(requested, inner, self.frame_height());
                    content_height = content_height.max(height);
                    MeasuredCell::Image {
                        name: loaded.name.clone(),
                        width,
                        height,
                    }
                }
            };
            cells.push(measured);
        }

        Ok(MeasuredRow {
            height: content_height + 2.0 * CELL_PADDING_Y,
            font,
            cells,
        })
    }

    fn draw_row(&mut self, row: &MeasuredRow, grid: &TableGrid<'_>) {
        let top = self.cursor;
        let line_height = TABLE_FONT_SIZE * LEADING;
        let mut x = grid.x;

        for (cell, &width) in row.cells.iter().zip(grid.widths) {
            match cell {
                MeasuredCell::Text { lines, background } => {
                    if let Some(color) = background {
                        self.ops.push(DrawOp::FillRect {
                            x,
                            y: top - row.height,
                            width,
                            height: row.height,
                            color: *color,
                        });
                    }
                    let mut baseline = top - CELL_PADDING_Y - TABLE_FONT_SIZE;
                    for line in lines.iter().filter(|l| !l.is_empty()) {
                        self.ops.push(DrawOp::Text {
                            x: x + CELL_PADDING_X,
                            y: baseline,
                            font: row.font,
                            size: TABLE_FONT_SIZE,
                            text: line.clone(),
                        });
                        baseline -= line_height;
                    }
                }
                MeasuredCell::Image {
                    name,
                    width: w,
                    height: h,
                } => self.ops.push(DrawOp::Image {
                    name: name.clone(),
                    x: x + CELL_PADDING_X,
                    y: top - CELL_PADDING_Y - h,
                    width: *w,
                    height: *h,
                }),
            }
            x += width;
        }

        self.advance(row.height);
    }

    /// Draw the rules of the part of a table that sits on one page.
    fn close_segment(&mut self, segment: Segment, grid: &TableGrid<'_>) {
        let bottom = self.cursor;
        let width: f32 = grid.widths.iter().sum();
        let right = grid.x + width;

        if grid.inner {
            for &y in segment.row_tops.iter().skip(1) {
                self.ops.push(DrawOp::Line {
                    from: (grid.x, y),
                    to: (right, y),
                });
            }
            let mut x = grid.x;
            for column in &grid.widths[..grid.widths.len().saturating_sub(1)] {
                x += column;
                self.ops.push(DrawOp::Line {
                    from: (x, segment.top),
                    to: (x, bottom),
                });
            }
        }

        if grid.border {
            self.ops.push(DrawOp::StrokeRect {
                x: grid.x,
                y: bottom,
                width,
                height: segment.top - bottom,
            });
        }
    }
}

/// Column geometry and rule settings of a table being laid out.
struct TableGrid<'w> {
    x: f32,
    widths: &'w [f32],
    border: bool,
    inner: bool,
}

/// Rows of a table placed on one page.
struct Segment {
    top: f32,
    row_tops: Vec<f32>,
}

impl Segment {
    fn new(top: f32) -> Self {
        Self {
            top,
            row_tops: Vec::new(),
        }
    }
}

struct MeasuredRow {
    height: f32,
    font: Font,
    cells: Vec<MeasuredCell>,
}

enum MeasuredCell {
    Text {
        lines: Vec<String>,
        background: Option<Color>,
    },
    Image {
        name: String,
        width: f32,
        height: f32,
    },
}

/// Scale `(width, height)` down, keeping the aspect ratio, until it fits.
///
/// Bounds below [`MIN_FIT_EXTENT`] are raised to it, so a box squeezed to
/// nothing still gets a visible image instead of an unscaled one.
fn fit((width, height): (f32, f32), max_width: f32, max_height: f32) -> (f32, f32) {
    let max_width = max_width.max(MIN_FIT_EXTENT);
    let max_height = max_height.max(MIN_FIT_EXTENT);
    let scale = (max_width / width).min(max_height / height);
    if scale < 1.0 {
        (width * scale, height * scale)
    } else {
        (width, height)
    }
}
