//! Table types.

use super::style::{Color, Placement};
use super::Image;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A table structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table, never empty
    pub rows: Vec<TableRow>,

    /// Table style
    pub style: TableStyle,
}

impl Table {
    /// Create a table. Fails when `rows` is empty.
    pub fn new(rows: Vec<TableRow>, style: TableStyle) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::validation("rows", "a table needs at least one row"));
        }
        style.placement.validate()?;
        Ok(Self { rows, style })
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// The header row, when the table has one.
    pub fn header(&self) -> Option<&TableRow> {
        if self.style.header {
            self.rows.first()
        } else {
            None
        }
    }

    /// Rows that are not the header.
    pub fn body(&self) -> &[TableRow] {
        if self.style.header {
            &self.rows[1..]
        } else {
            &self.rows
        }
    }

    /// Images embedded in cells, in row order.
    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .filter_map(|c| match c {
                TableCell::Image(image) => Some(image),
                TableCell::Text(_) => None,
            })
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Table styling properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    /// Alignment and margins
    #[serde(flatten)]
    pub placement: Placement,

    /// Draw a box around the table
    pub border: bool,

    /// Render the first row as a header
    pub header: bool,

    /// Draw lines between cells
    pub grid: bool,
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row, never empty
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a row. Fails when `cells` is empty.
    pub fn new(cells: Vec<TableCell>) -> Result<Self> {
        if cells.is_empty() {
            return Err(Error::validation("row", "a row needs at least one cell"));
        }
        Ok(Self { cells })
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Result<Self> {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell: text or an embedded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableCell {
    /// A text cell
    Text(TextCell),
    /// An image cell
    Image(Image),
}

impl TableCell {
    /// Create a text cell without background.
    pub fn text(text: impl Into<String>) -> Self {
        TableCell::Text(TextCell {
            text: text.into(),
            background_color: None,
        })
    }

    /// Get plain text content. Image cells have none.
    pub fn plain_text(&self) -> &str {
        match self {
            TableCell::Text(cell) => &cell.text,
            TableCell::Image(_) => "",
        }
    }

    /// Background colour, if any.
    pub fn background_color(&self) -> Option<Color> {
        match self {
            TableCell::Text(cell) => cell.background_color,
            TableCell::Image(_) => None,
        }
    }
}

/// Content of a text cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCell {
    /// Text content, already substituted
    pub text: String,

    /// Cell background
    pub background_color: Option<Color>,
}
