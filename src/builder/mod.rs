//! Document builder: parsed YAML tree to validated [`Document`].
//!
//! The builder accepts three document shapes:
//!
//! ```yaml
//! # a list of single-key entries
//! - paragraph: Hello
//! - image: logo.png
//! ```
//!
//! ```yaml
//! # a mapping of element keys, in document order
//! paragraph: Hello
//! table:
//!   rows:
//!     - row: [a, b]
//! ```
//!
//! ```yaml
//! # a mapping with document sections
//! sheet: { size: letter }
//! metadata: { title: Report }
//! variables: { name: World }
//! content:
//!   - paragraph: Hello <name>
//! ```
//!
//! Building is fail-fast: the first error aborts and no partial document is
//! returned.

mod elements;
mod fields;
mod options;
mod settings;

pub use options::BuildOptions;

use crate::error::{Error, Result};
use crate::model::{Document, ElementKind};
use crate::variables::VariableMap;
use fields::describe;
use serde_yaml::{Mapping, Value};
use std::io::Read;
use std::path::Path;

/// State shared by element constructors during one build.
pub(crate) struct BuildContext {
    pub(crate) variables: VariableMap,
}

/// Builds documents from YAML.
///
/// The builder holds only its options; each call to [`build`](Self::build)
/// is independent.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    options: BuildOptions,
}

impl DocumentBuilder {
    /// Create a builder with default options (no variables).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom options.
    pub fn with_options(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Get the build options.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build a document from a parsed YAML tree.
    pub fn build(&self, tree: &Value) -> Result<Document> {
        let mut document = Document::new();

        match tree {
            Value::Null => {}
            Value::Sequence(entries) => {
                let ctx = self.context(None)?;
                build_entries(&mut document, entries, "content", &ctx)?;
            }
            Value::Mapping(mapping) => self.build_mapping(&mut document, mapping)?,
            other => {
                return Err(Error::validation(
                    "document",
                    format!(
                        "expected a list of elements or a mapping, found {}",
                        describe(other)
                    ),
                ))
            }
        }

        log::info!(
            "Built document with {} element(s), {} image(s)",
            document.len(),
            document.images().len()
        );
        Ok(document)
    }

    /// Parse and build a document from YAML text.
    pub fn build_str(&self, yaml: &str) -> Result<Document> {
        let tree: Value = serde_yaml::from_str(yaml)?;
        self.build(&tree)
    }

    /// Parse and build a document from a reader.
    pub fn build_reader<R: Read>(&self, reader: R) -> Result<Document> {
        let tree: Value = serde_yaml::from_reader(reader)?;
        self.build(&tree)
    }

    /// Read, parse and build a document from a YAML file.
    pub fn build_file<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let path = path.as_ref();
        log::debug!("Reading document {}", path.display());
        let yaml = std::fs::read_to_string(path)?;
        self.build_str(&yaml)
    }

    /// Caller variables, with the document's own `variables:` as defaults.
    fn context(&self, document_variables: Option<&Value>) -> Result<BuildContext> {
        let mut variables = self.options.variables.clone();

        if let Some(value) = document_variables.filter(|_| self.options.document_variables) {
            let defaults = match value {
                Value::Null => VariableMap::new(),
                Value::Mapping(mapping) => VariableMap::from_mapping(mapping, "variables")?,
                other => {
                    return Err(Error::validation(
                        "variables",
                        format!("expected a mapping, found {}", describe(other)),
                    ))
                }
            };
            log::debug!("Document defines {} default variable(s)", defaults.len());
            variables.merge_defaults(&defaults);
        }

        Ok(BuildContext { variables })
    }

    fn build_mapping(&self, document: &mut Document, mapping: &Mapping) -> Result<()> {
        let ctx = self.context(mapping.get("variables"))?;

        for (key, value) in mapping {
            let key = key.as_str().ok_or_else(|| {
                Error::validation("document", format!("keys must be strings, found {}", describe(key)))
            })?;

            match key {
                "variables" => {}
                "sheet" => document.sheet = settings::build_sheet(value, "sheet")?,
                "metadata" => document.metadata = settings::build_metadata(value, "metadata")?,
                "content" => match value {
                    Value::Sequence(entries) => build_entries(document, entries, "content", &ctx)?,
                    Value::Null => {}
                    other => {
                        return Err(Error::validation(
                            "content",
                            format!("expected a list of elements, found {}", describe(other)),
                        ))
                    }
                },
                _ if ElementKind::from_key(key).is_some() => {
                    document.push(elements::build_element(key, value, "", &ctx)?);
                }
                _ => return Err(Error::unsupported(key, "document")),
            }
        }
        Ok(())
    }
}

/// Build a list of single-key entries, appending to `document`.
fn build_entries(
    document: &mut Document,
    entries: &[Value],
    path: &str,
    ctx: &BuildContext,
) -> Result<()> {
    for (i, entry) in entries.iter().enumerate() {
        let entry_path = format!("{}[{}]", path, i);
        let (key, value) = single_entry(entry, &entry_path)?;
        document.push(elements::build_element(key, value, &entry_path, ctx)?);
    }
    Ok(())
}

fn single_entry<'a>(entry: &'a Value, path: &str) -> Result<(&'a str, &'a Value)> {
    let mapping = match entry {
        Value::Mapping(m) => m,
        other => {
            return Err(Error::validation(
                path,
                format!("expected an element entry, found {}", describe(other)),
            ))
        }
    };
    if mapping.len() != 1 {
        return Err(Error::validation(
            path,
            format!("expected exactly one element key, found {}", mapping.len()),
        ));
    }
    match mapping.iter().next() {
        Some((key, value)) => key
            .as_str()
            .map(|k| (k, value))
            .ok_or_else(|| Error::validation(path, "element keys must be strings")),
        None => Err(Error::validation(path, "expected an element entry")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, Orientation, PageSize};

    fn build(yaml: &str) -> Result<Document> {
        DocumentBuilder::new().build_str(yaml)
    }

    #[test]
    fn test_sequence_document_keeps_order() {
        let doc = build(
            r#"
- paragraph: First
- table:
    rows:
      - row: [a, b]
- image: logo.png
- paragraph: Last
"#,
        )
        .unwrap();

        let kinds: Vec<_> = doc.iter().map(Element::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::Paragraph,
                ElementKind::Table,
                ElementKind::Image,
                ElementKind::Paragraph
            ]
        );
        assert_eq!(doc.elements[0].plain_text(), "First");
        assert_eq!(doc.elements[3].plain_text(), "Last");
    }

    #[test]
    fn test_mapping_document() {
        let doc = build("paragraph: Hello\nimage: logo.png\n").unwrap();
        assert_eq!(doc.len(), 2);
        assert!(doc.elements[0].is_paragraph());
        assert!(doc.elements[1].is_image());
    }

    #[test]
    fn test_sectioned_document() {
        let doc = build(
            r#"
sheet:
  size: letter
  orientation: landscape
metadata:
  title: Device label
content:
  - paragraph: Hello <name>
"#,
        )
        .unwrap();
        assert_eq!(doc.sheet.size, PageSize::Letter);
        assert_eq!(doc.sheet.orientation, Orientation::Landscape);
        assert_eq!(doc.metadata.title.as_deref(), Some("Device label"));
        assert_eq!(doc.elements[0].plain_text(), "Hello <name>");
    }

    #[test]
    fn test_unknown_top_level_key() {
        let err = build("paragraph: ok\nfoo: bar\n").unwrap_err();
        match err {
            Error::UnsupportedElement { key, .. } => assert_eq!(key, "foo"),
            other => panic!("unexpected error: {other}"),
        }

        let err = build("- paragraph: ok\n- foo: bar\n").unwrap_err();
        match err {
            Error::UnsupportedElement { key, path } => {
                assert_eq!(key, "foo");
                assert_eq!(path, "content[1]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_caller_variables_override_document_defaults() {
        let yaml = r#"
variables:
  serial_number: "000"
  model: Incubator
content:
  - paragraph: "<model> - UDI (S/N: <serial_number>)"
"#;
        let doc = build(yaml).unwrap();
        assert_eq!(doc.elements[0].plain_text(), "Incubator - UDI (S/N: 000)");

        let builder = DocumentBuilder::with_options(
            BuildOptions::new().with_variable("serial_number", "123456789"),
        );
        let doc = builder.build_str(yaml).unwrap();
        assert_eq!(
            doc.elements[0].plain_text(),
            "Incubator - UDI (S/N: 123456789)"
        );

        let builder = DocumentBuilder::with_options(BuildOptions::new().without_document_variables());
        let doc = builder.build_str(yaml).unwrap();
        assert_eq!(
            doc.elements[0].plain_text(),
            "<model> - UDI (S/N: <serial_number>)"
        );
    }

    #[test]
    fn test_variables_section_position_does_not_matter() {
        let doc = build("content:\n  - paragraph: <a>\nvariables:\n  a: late\n").unwrap();
        assert_eq!(doc.elements[0].plain_text(), "late");
    }

    #[test]
    fn test_empty_document() {
        assert!(build("").unwrap().is_empty());
        assert!(build("[]").unwrap().is_empty());
        assert!(build("content: []").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(build("just text"), Err(Error::Validation { .. })));
        assert!(matches!(build("- plain"), Err(Error::Validation { .. })));
        assert!(matches!(
            build("- paragraph: a\n  image: b.png\n"),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(build("content: 3"), Err(Error::Validation { .. })));
        assert!(matches!(build("variables: [a]"), Err(Error::Validation { .. })));
        assert!(matches!(build("key: [unclosed"), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_error_paths_are_rooted_at_entry() {
        let err = build("- paragraph: a\n- table:\n    rows:\n      - row:\n          - {}\n")
            .unwrap_err();
        assert_eq!(err.path(), Some("content[1].table.rows[0].row[0]"));
    }

    #[test]
    fn test_builder_is_stateless() {
        let builder = DocumentBuilder::new();
        let a = builder.build_str("- paragraph: x").unwrap();
        let b = builder.build_str("- paragraph: x").unwrap();
        assert_eq!(a, b);
    }
}
