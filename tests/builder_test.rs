//! Integration tests for building documents from YAML.

use pdfgen::{
    build_str, load_variables, Alignment, BuildOptions, DocumentBuilder, Element, Error,
    TableCell, VariableMap,
};

const LABEL: &str = r##"
metadata:
  title: Device label
variables:
  model: Incubator
content:
  - paragraph:
      text: "<model> - UDI (S/N: <serial_number>)"
      size: 16
      alignment: center
      space_after: 6
  - table:
      header: true
      border: true
      grid: true
      rows:
        - row:
            - text: Field
              background_color: "#dddddd"
            - text: Value
              background_color: "#dddddd"
        - row:
            - Serial
            - text: "<serial_number>"
        - row:
            - Lot
            - "<lot>"
  - image:
      resource: logo.png
      width: 120
      alignment: right
"##;

#[test]
fn test_label_document() {
    let vars = VariableMap::new().with("serial_number", "123456789");
    let doc = build_str(LABEL, &vars).unwrap();

    assert_eq!(doc.metadata.title.as_deref(), Some("Device label"));
    assert_eq!(doc.len(), 3);

    let Element::Paragraph(title) = &doc.elements[0] else {
        panic!("expected a paragraph first");
    };
    assert_eq!(title.text, "Incubator - UDI (S/N: 123456789)");
    assert_eq!(title.style.size, 16.0);
    assert_eq!(title.style.placement.alignment, Alignment::Center);
    assert_eq!(title.style.placement.space_after, 6.0);

    let Element::Table(table) = &doc.elements[1] else {
        panic!("expected a table second");
    };
    assert!(table.style.header);
    assert_eq!(table.header().unwrap().plain_text(), "Field\tValue");
    assert_eq!(table.rows[1].cells[1].plain_text(), "123456789");
    // unknown variables stay literal
    assert_eq!(table.rows[2].cells[1].plain_text(), "<lot>");

    let Element::Image(image) = &doc.elements[2] else {
        panic!("expected an image last");
    };
    assert_eq!(image.resource, "logo.png");
    assert_eq!(image.width, Some(120.0));
    assert_eq!(image.height, None);
}

#[test]
fn test_without_variables_placeholders_remain() {
    let doc = build_str(
        "- paragraph: \"Incubator - UDI (S/N: <serial_number>)\"",
        &VariableMap::new(),
    )
    .unwrap();
    assert_eq!(doc.plain_text(), "Incubator - UDI (S/N: <serial_number>)");

    let doc = build_str("- paragraph: \"<unknown_var>\"", &VariableMap::new()).unwrap();
    assert_eq!(doc.plain_text(), "<unknown_var>");
}

#[test]
fn test_unknown_top_level_key_gives_no_document() {
    let yaml = "- paragraph: kept?\n- foo: bar\n- paragraph: never\n";
    match build_str(yaml, &VariableMap::new()) {
        Err(Error::UnsupportedElement { key, path }) => {
            assert_eq!(key, "foo");
            assert_eq!(path, "content[1]");
        }
        other => panic!("expected an unsupported element error, got {other:?}"),
    }

    let err = build_str("foo:\n  a: 1\n", &VariableMap::new()).unwrap_err();
    assert!(err.to_string().contains("'foo'"));
}

#[test]
fn test_table_row_counts() {
    let err = build_str("- table:\n    rows: []\n", &VariableMap::new()).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    let doc = build_str("- table:\n    rows:\n      - row: [only]\n", &VariableMap::new()).unwrap();
    let Element::Table(table) = &doc.elements[0] else {
        panic!("expected a table");
    };
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.column_count(), 1);
}

#[test]
fn test_image_without_resource() {
    let err = build_str("- image:\n    width: 40\n", &VariableMap::new()).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert!(err.to_string().contains("resource"));
    assert_eq!(err.path(), Some("content[0].image"));
}

#[test]
fn test_diagonal_alignment_rejected_everywhere() {
    for yaml in [
        "- paragraph:\n    text: a\n    alignment: diagonal\n",
        "- image:\n    resource: a.png\n    alignment: diagonal\n",
        "- table:\n    alignment: diagonal\n    rows:\n      - row: [a]\n",
    ] {
        let err = build_str(yaml, &VariableMap::new()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }), "{yaml}");
        assert!(err.to_string().contains("diagonal"), "{err}");
    }
}

#[test]
fn test_validation_error_path_for_empty_cell() {
    let yaml = r#"
table:
  rows:
    - row: [a]
    - row: [b]
    - row:
        - {}
"#;
    let err = build_str(yaml, &VariableMap::new()).unwrap_err();
    assert_eq!(err.to_string(), "table.rows[2].row[0]: missing text or image");
}

#[test]
fn test_image_cells() {
    let yaml = r#"
- table:
    rows:
      - row:
          - image:
              resource: "<not-substituted>.png"
              height: 20
          - text: caption
"#;
    let vars = VariableMap::new().with("not-substituted", "x");
    let doc = build_str(yaml, &vars).unwrap();
    let Element::Table(table) = &doc.elements[0] else {
        panic!("expected a table");
    };
    match &table.rows[0].cells[0] {
        TableCell::Image(image) => {
            assert_eq!(image.resource, "<not-substituted>.png");
            assert_eq!(image.height, Some(20.0));
        }
        other => panic!("expected an image cell, got {other:?}"),
    }
}

#[test]
fn test_load_variables_matches_builder_substitution() {
    let tree: serde_yaml::Value = serde_yaml::from_str(LABEL).unwrap();
    let vars = VariableMap::new()
        .with("serial_number", "987")
        .with("model", "Freezer");

    let substituted = load_variables(&tree, &vars);
    let from_tree = DocumentBuilder::new().build(&substituted).unwrap();
    let direct = DocumentBuilder::with_options(BuildOptions::new().with_variables(vars))
        .build(&tree)
        .unwrap();

    assert_eq!(from_tree, direct);
    assert_eq!(
        from_tree.elements[0].plain_text(),
        "Freezer - UDI (S/N: 987)"
    );
}

#[test]
fn test_sheet_section() {
    let yaml = r#"
sheet:
  size: [300, 200]
  margin: 20
content:
  - paragraph: small
"#;
    let doc = build_str(yaml, &VariableMap::new()).unwrap();
    assert_eq!(doc.sheet.dimensions(), (200.0, 300.0));
    assert_eq!(doc.sheet.frame_width(), 160.0);

    let err = build_str("sheet:\n  margin: 500\n", &VariableMap::new()).unwrap_err();
    assert_eq!(err.path(), Some("sheet.margin"));
}

#[test]
fn test_malformed_yaml() {
    let err = build_str("- paragraph: [unclosed", &VariableMap::new()).unwrap_err();
    assert!(matches!(err, Error::Yaml(_)));
}
