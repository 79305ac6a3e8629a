//! Document-level sections: `sheet` and `metadata`.

use super::fields::{describe, Fields};
use crate::error::{Error, Result};
use crate::model::{Margins, Metadata, Orientation, PageSize, Sheet};
use serde_yaml::Value;

const SHEET_KEYS: &[&str] = &["size", "orientation", "margin"];
const MARGIN_KEYS: &[&str] = &["top", "bottom", "left", "right"];
const METADATA_KEYS: &[&str] = &["title", "author", "subject", "keywords"];

pub(crate) fn build_sheet(value: &Value, path: &str) -> Result<Sheet> {
    let fields = Fields::new(value, path)?;
    fields.check_keys(SHEET_KEYS)?;

    let size = match fields.get("size") {
        None => PageSize::default(),
        Some(Value::String(name)) => name.parse::<PageSize>().map_err(|e| e.within(path))?,
        Some(Value::Sequence(dims)) => custom_size(dims, &fields.field_path("size"))?,
        Some(other) => {
            return Err(Error::validation(
                fields.field_path("size"),
                format!("expected a paper name or [width, height], found {}", describe(other)),
            ))
        }
    };

    let orientation = fields.parse::<Orientation>("orientation")?.unwrap_or_default();

    let margin_path = fields.field_path("margin");
    let margin = match fields.get("margin") {
        None => Margins::default(),
        Some(Value::Number(n)) => Margins::uniform(n.as_f64().unwrap_or(-1.0) as f32),
        Some(value @ Value::Mapping(_)) => {
            let sides = Fields::new(value, &margin_path)?;
            sides.check_keys(MARGIN_KEYS)?;
            let default = Margins::default();
            Margins {
                top: sides.number("top")?.unwrap_or(default.top),
                bottom: sides.number("bottom")?.unwrap_or(default.bottom),
                left: sides.number("left")?.unwrap_or(default.left),
                right: sides.number("right")?.unwrap_or(default.right),
            }
        }
        Some(other) => {
            return Err(Error::validation(
                margin_path,
                format!("expected a number or a mapping of sides, found {}", describe(other)),
            ))
        }
    };

    let sheet = Sheet {
        size,
        orientation,
        margin,
    };
    sheet.validate().map_err(|e| e.within(path))?;
    Ok(sheet)
}

fn custom_size(dims: &[Value], path: &str) -> Result<PageSize> {
    let numbers: Vec<f32> = dims
        .iter()
        .filter_map(|v| v.as_f64().map(|f| f as f32))
        .collect();
    match numbers[..] {
        [width, height] if dims.len() == 2 => Ok(PageSize::Custom { width, height }),
        _ => Err(Error::validation(path, "expected [width, height] in points")),
    }
}

pub(crate) fn build_metadata(value: &Value, path: &str) -> Result<Metadata> {
    let fields = Fields::new(value, path)?;
    fields.check_keys(METADATA_KEYS)?;
    Ok(Metadata {
        title: fields.text("title")?,
        author: fields.text("author")?,
        subject: fields.text("subject")?,
        keywords: fields.text("keywords")?,
    })
}
