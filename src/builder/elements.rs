//! Element constructors, one per YAML key.

use super::fields::{describe, join_path, scalar_text, Fields};
use super::BuildContext;
use crate::error::{Error, Result};
use crate::model::{
    Element, ElementKind, Image, Paragraph, ParagraphStyle, Table, TableCell, TableRow,
    TableStyle, TextCell, DEFAULT_FONT_SIZE,
};
use serde_yaml::Value;

/// Builds one element from the value under its key.
pub(crate) type Constructor = fn(&Value, &str, &BuildContext) -> Result<Element>;

/// The constructor registered for an element kind.
pub(crate) fn constructor_for(kind: ElementKind) -> Constructor {
    match kind {
        ElementKind::Paragraph => build_paragraph,
        ElementKind::Table => build_table,
        ElementKind::Image => build_image,
    }
}

/// Dispatch `key` to its constructor, or fail with Unsupported-Element.
pub(crate) fn build_element(
    key: &str,
    value: &Value,
    path: &str,
    ctx: &BuildContext,
) -> Result<Element> {
    let kind = ElementKind::from_key(key).ok_or_else(|| Error::unsupported(key, path))?;
    let element_path = join_path(path, key);
    let element = constructor_for(kind)(value, &element_path, ctx)?;
    log::debug!("Built {} at {}", kind, element_path);
    Ok(element)
}

const PARAGRAPH_KEYS: &[&str] = &["text", "size", "alignment", "space_before", "space_after"];
const TABLE_KEYS: &[&str] = &[
    "rows",
    "border",
    "header",
    "grid",
    "alignment",
    "space_before",
    "space_after",
];
const IMAGE_KEYS: &[&str] = &["resource", "width", "height", "alignment", "space_before", "space_after"];
const TEXT_CELL_KEYS: &[&str] = &["text", "background_color"];

fn build_paragraph(value: &Value, path: &str, ctx: &BuildContext) -> Result<Element> {
    // `paragraph: some text`
    if let Some(text) = scalar_text(value) {
        let text = ctx.variables.substitute(&text).into_owned();
        return Ok(Paragraph::with_text(text).into());
    }

    let fields = Fields::new(value, path)?;
    fields.check_keys(PARAGRAPH_KEYS)?;
    let text = fields.required_text("text")?;
    let text = ctx.variables.substitute(&text).into_owned();
    let style = ParagraphStyle {
        placement: fields.placement()?,
        size: fields.number("size")?.unwrap_or(DEFAULT_FONT_SIZE),
    };
    let paragraph = Paragraph::new(text, style).map_err(|e| e.within(path))?;
    Ok(paragraph.into())
}

fn build_image(value: &Value, path: &str, _ctx: &BuildContext) -> Result<Element> {
    Ok(image_from_value(value, path)?.into())
}

/// Image attributes are never substituted.
fn image_from_value(value: &Value, path: &str) -> Result<Image> {
    // `image: logo.png`
    if let Value::String(resource) = value {
        return Image::new(resource.clone()).map_err(|e| e.within(path));
    }

    let fields = Fields::new(value, path)?;
    fields.check_keys(IMAGE_KEYS)?;
    let resource = fields.required_text("resource")?;
    let placement = fields.placement()?;
    Image::with_options(
        resource,
        fields.number("width")?,
        fields.number("height")?,
        placement,
    )
    .map_err(|e| e.within(path))
}

fn build_table(value: &Value, path: &str, ctx: &BuildContext) -> Result<Element> {
    let fields = Fields::new(value, path)?;
    fields.check_keys(TABLE_KEYS)?;

    let style = TableStyle {
        placement: fields.placement()?,
        border: fields.bool("border")?.unwrap_or(false),
        header: fields.bool("header")?.unwrap_or(false),
        grid: fields.bool("grid")?.unwrap_or(false),
    };

    let rows_path = fields.field_path("rows");
    let rows = match fields.get("rows") {
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| build_row(item, &format!("{}[{}]", rows_path, i), ctx))
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::validation(
                rows_path,
                format!("expected a list of rows, found {}", describe(other)),
            ))
        }
        None => Vec::new(),
    };

    let table = Table::new(rows, style).map_err(|e| e.within(fields.path()))?;
    Ok(table.into())
}

/// A row entry: `- row: [cell, ...]`.
fn build_row(value: &Value, path: &str, ctx: &BuildContext) -> Result<TableRow> {
    let entry = match value {
        Value::Mapping(m) if m.len() == 1 => m,
        _ => {
            return Err(Error::validation(
                path,
                format!("expected a 'row' entry, found {}", describe(value)),
            ))
        }
    };
    let (key, cells) = entry
        .iter()
        .next()
        .ok_or_else(|| Error::validation(path, "expected a 'row' entry"))?;
    match key.as_str() {
        Some("row") => {}
        Some(other) => return Err(Error::unsupported(other, path)),
        None => return Err(Error::validation(path, "expected a 'row' entry")),
    }

    let row_path = join_path(path, "row");
    let cells = match cells {
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| build_cell(item, &format!("{}[{}]", row_path, i), ctx))
            .collect::<Result<Vec<_>>>()?,
        Value::Null => Vec::new(),
        other => {
            return Err(Error::validation(
                row_path,
                format!("expected a list of cells, found {}", describe(other)),
            ))
        }
    };

    TableRow::new(cells).map_err(|e| e.within(path))
}

/// A cell: `{text, background_color?}`, `{image: ...}`, or bare text.
fn build_cell(value: &Value, path: &str, ctx: &BuildContext) -> Result<TableCell> {
    if let Some(text) = scalar_text(value) {
        return Ok(TableCell::text(ctx.variables.substitute(&text).into_owned()));
    }
    if value.is_null() {
        return Err(Error::validation(path, "missing text or image"));
    }

    let fields = Fields::new(value, path)?;
    for key in fields.keys() {
        match key {
            Some("text" | "background_color" | "image") => {}
            Some(other) => return Err(Error::unsupported(other, path)),
            None => return Err(Error::validation(path, "cell keys must be strings")),
        }
    }

    match (fields.contains("text"), fields.get("image")) {
        (true, Some(_)) => Err(Error::validation(
            path,
            "a cell holds either text or an image, not both",
        )),
        (false, Some(image)) => {
            if fields.contains("background_color") {
                return Err(Error::validation(
                    fields.field_path("background_color"),
                    "only text cells have a background",
                ));
            }
            let image = image_from_value(image, &fields.field_path("image"))?;
            Ok(TableCell::Image(image))
        }
        (true, None) => {
            fields.check_keys(TEXT_CELL_KEYS)?;
            let text = fields.required_text("text")?;
            let background_color = fields.parse("background_color")?;
            Ok(TableCell::Text(TextCell {
                text: ctx.variables.substitute(&text).into_owned(),
                background_color,
            }))
        }
        (false, None) => Err(Error::validation(path, "missing text or image")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alignment, Color};
    use crate::variables::VariableMap;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn ctx() -> BuildContext {
        BuildContext {
            variables: VariableMap::new(),
        }
    }

    #[test]
    fn test_paragraph_full() {
        let value = yaml("text: Hello\nsize: 18\nalignment: center\nspace_before: 4\nspace_after: 8\n");
        let el = build_element("paragraph", &value, "content[0]", &ctx()).unwrap();
        let Element::Paragraph(p) = el else {
            panic!("expected paragraph")
        };
        assert_eq!(p.text, "Hello");
        assert_eq!(p.style.size, 18.0);
        assert_eq!(p.style.placement.alignment, Alignment::Center);
        assert_eq!(p.style.placement.space_before, 4.0);
        assert_eq!(p.style.placement.space_after, 8.0);
    }

    #[test]
    fn test_paragraph_shorthand_and_substitution() {
        let ctx = BuildContext {
            variables: VariableMap::new().with("who", "world"),
        };
        let el = build_element("paragraph", &yaml("Hello <who>"), "content[0]", &ctx).unwrap();
        assert_eq!(el.plain_text(), "Hello world");
    }

    #[test]
    fn test_paragraph_requires_text() {
        let err = build_element("paragraph", &yaml("size: 10"), "content[2]", &ctx()).unwrap_err();
        assert_eq!(err.path(), Some("content[2].paragraph"));
        assert!(err.to_string().contains("'text'"));
    }

    #[test]
    fn test_paragraph_rejects_negative_size() {
        let err = build_element("paragraph", &yaml("text: a\nsize: -1"), "content[0]", &ctx())
            .unwrap_err();
        assert_eq!(err.path(), Some("content[0].paragraph.size"));
    }

    #[test]
    fn test_unknown_attribute() {
        let err = build_element("paragraph", &yaml("text: a\nbold: true"), "content[0]", &ctx())
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(err.path(), Some("content[0].paragraph.bold"));
    }

    #[test]
    fn test_unsupported_key() {
        let err = build_element("foo", &yaml("a: 1"), "content[4]", &ctx()).unwrap_err();
        match err {
            Error::UnsupportedElement { key, path } => {
                assert_eq!(key, "foo");
                assert_eq!(path, "content[4]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_image_requires_resource() {
        let err = build_element("image", &yaml("width: 10"), "content[0]", &ctx()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("resource"));
    }

    #[test]
    fn test_image_shorthand() {
        let el = build_element("image", &yaml("logo.png"), "content[0]", &ctx()).unwrap();
        let Element::Image(image) = el else {
            panic!("expected image")
        };
        assert_eq!(image.resource, "logo.png");
        assert_eq!(image.width, None);
    }

    #[test]
    fn test_image_resource_not_substituted() {
        let ctx = BuildContext {
            variables: VariableMap::new().with("name", "x"),
        };
        let el = build_element("image", &yaml("resource: <name>.png"), "c", &ctx).unwrap();
        let Element::Image(image) = el else {
            panic!("expected image")
        };
        assert_eq!(image.resource, "<name>.png");
    }

    #[test]
    fn test_table_full() {
        let value = yaml(
            r##"
border: true
header: true
grid: true
alignment: right
rows:
  - row:
      - text: Name
        background_color: "#cccccc"
      - text: Serial
  - row:
      - Widget
      - image:
          resource: logo.png
          width: 20
"##,
        );
        let el = build_element("table", &value, "content[0]", &ctx()).unwrap();
        let Element::Table(table) = el else {
            panic!("expected table")
        };
        assert!(table.style.border && table.style.header && table.style.grid);
        assert_eq!(table.style.placement.alignment, Alignment::Right);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows[0].cells[0].background_color(),
            Some(Color::rgb(204, 204, 204))
        );
        assert_eq!(table.rows[1].cells[0].plain_text(), "Widget");
        assert!(matches!(table.rows[1].cells[1], TableCell::Image(_)));
    }

    #[test]
    fn test_table_zero_rows() {
        let err = build_element("table", &yaml("rows: []"), "content[0]", &ctx()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(err.path(), Some("content[0].table.rows"));

        let err = build_element("table", &yaml("border: true"), "content[0]", &ctx()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_table_one_row_one_cell() {
        let value = yaml("rows:\n  - row:\n      - text: only\n");
        let el = build_element("table", &value, "content[0]", &ctx()).unwrap();
        assert_eq!(el.plain_text(), "only");
    }

    #[test]
    fn test_table_empty_row() {
        let value = yaml("rows:\n  - row: []\n");
        let err = build_element("table", &value, "content[0]", &ctx()).unwrap_err();
        assert_eq!(err.path(), Some("content[0].table.rows[0].row"));
    }

    #[test]
    fn test_cell_missing_text_or_image() {
        let value = yaml(
            r##"
rows:
  - row: [a]
  - row: [b]
  - row:
      - background_color: red
"##,
        );
        let err = build_element("table", &value, "", &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "table.rows[2].row[0]: missing text or image");
    }

    #[test]
    fn test_cell_unknown_key_is_unsupported() {
        let value = yaml("rows:\n  - row:\n      - chart: pie\n");
        let err = build_element("table", &value, "content[0]", &ctx()).unwrap_err();
        match err {
            Error::UnsupportedElement { key, path } => {
                assert_eq!(key, "chart");
                assert_eq!(path, "content[0].table.rows[0].row[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_row_entry_must_be_row() {
        let value = yaml("rows:\n  - column: [a]\n");
        let err = build_element("table", &value, "content[0]", &ctx()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedElement { ref key, .. } if key == "column"));
    }

    #[test]
    fn test_cell_text_and_image_conflict() {
        let value = yaml("rows:\n  - row:\n      - text: a\n        image: b.png\n");
        let err = build_element("table", &value, "content[0]", &ctx()).unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn test_cell_bad_color() {
        let value = yaml("rows:\n  - row:\n      - text: a\n        background_color: '#12'\n");
        let err = build_element("table", &value, "content[0]", &ctx()).unwrap_err();
        assert_eq!(
            err.path(),
            Some("content[0].table.rows[0].row[0].background_color")
        );
    }

    #[test]
    fn test_cell_text_substituted() {
        let ctx = BuildContext {
            variables: VariableMap::new().with("sn", "123"),
        };
        let value = yaml("rows:\n  - row:\n      - text: 'S/N <sn>'\n      - '<sn>'\n");
        let el = build_element("table", &value, "content[0]", &ctx).unwrap();
        assert_eq!(el.plain_text(), "S/N 123\t123");
    }

    #[test]
    fn test_diagonal_alignment_fails_for_every_kind() {
        let cases = [
            ("paragraph", "text: a\nalignment: diagonal"),
            ("image", "resource: a.png\nalignment: diagonal"),
            ("table", "alignment: diagonal\nrows:\n  - row: [a]"),
        ];
        for (key, body) in cases {
            let err = build_element(key, &yaml(body), "content[0]", &ctx()).unwrap_err();
            assert!(matches!(err, Error::Validation { .. }), "{key}");
            assert_eq!(
                err.path().map(str::to_string),
                Some(format!("content[0].{}.alignment", key))
            );
        }
    }
}
