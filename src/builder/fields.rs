//! Typed access to the attributes of a YAML mapping, with error paths.

use crate::error::{Error, Result};
use crate::model::{Alignment, Placement};
use serde_yaml::{Mapping, Value};
use std::str::FromStr;

/// Attributes of one element, addressed by `path` in error messages.
pub(crate) struct Fields<'a> {
    mapping: &'a Mapping,
    path: &'a str,
}

impl<'a> Fields<'a> {
    /// Wrap a mapping. Anything else is a validation error.
    pub(crate) fn new(value: &'a Value, path: &'a str) -> Result<Self> {
        match value {
            Value::Mapping(mapping) => Ok(Self { mapping, path }),
            Value::Null => Err(Error::validation(path, "expected attributes, found nothing")),
            _ => Err(Error::validation(
                path,
                format!("expected a mapping of attributes, found {}", describe(value)),
            )),
        }
    }

    pub(crate) fn path(&self) -> &str {
        self.path
    }

    /// Path of an attribute of this element.
    pub(crate) fn field_path(&self, key: &str) -> String {
        join_path(self.path, key)
    }

    /// Reject keys outside `allowed`.
    pub(crate) fn check_keys(&self, allowed: &[&str]) -> Result<()> {
        for key in self.mapping.keys() {
            match key.as_str() {
                Some(k) if allowed.contains(&k) => {}
                Some(k) => {
                    return Err(Error::validation(
                        self.field_path(k),
                        format!("unknown attribute (expected one of: {})", allowed.join(", ")),
                    ))
                }
                None => {
                    return Err(Error::validation(
                        self.path,
                        format!("attribute names must be strings, found {}", describe(key)),
                    ))
                }
            }
        }
        Ok(())
    }

    /// Keys present in the mapping, in document order.
    pub(crate) fn keys(&self) -> impl Iterator<Item = Option<&'a str>> {
        self.mapping.keys().map(Value::as_str)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        matches!(self.mapping.get(key), Some(v) if !v.is_null())
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.mapping.get(key).filter(|v| !v.is_null())
    }

    /// A text attribute. Numbers and booleans are taken as written.
    pub(crate) fn text(&self, key: &str) -> Result<Option<String>> {
        self.get(key)
            .map(|v| scalar_text(v).ok_or_else(|| self.type_error(key, "text", v)))
            .transpose()
    }

    /// A required text attribute.
    pub(crate) fn required_text(&self, key: &str) -> Result<String> {
        self.text(key)?.ok_or_else(|| self.missing(key))
    }

    pub(crate) fn number(&self, key: &str) -> Result<Option<f32>> {
        self.get(key)
            .map(|v| match v {
                Value::Number(n) => n
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| self.type_error(key, "a number", v)),
                _ => Err(self.type_error(key, "a number", v)),
            })
            .transpose()
    }

    pub(crate) fn bool(&self, key: &str) -> Result<Option<bool>> {
        self.get(key)
            .map(|v| v.as_bool().ok_or_else(|| self.type_error(key, "true or false", v)))
            .transpose()
    }

    /// A string attribute parsed with `FromStr`; parse errors are re-rooted
    /// at this element.
    pub(crate) fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr<Err = Error>,
    {
        self.get(key)
            .map(|v| {
                let s = v
                    .as_str()
                    .ok_or_else(|| self.type_error(key, "a string", v))?;
                s.parse::<T>().map_err(|e| e.within(self.path))
            })
            .transpose()
    }

    /// The common `alignment`, `space_before` and `space_after` attributes.
    pub(crate) fn placement(&self) -> Result<Placement> {
        let placement = Placement {
            alignment: self.parse::<Alignment>("alignment")?.unwrap_or_default(),
            space_before: self.number("space_before")?.unwrap_or(0.0),
            space_after: self.number("space_after")?.unwrap_or(0.0),
        };
        placement.validate().map_err(|e| e.within(self.path))?;
        Ok(placement)
    }

    pub(crate) fn missing(&self, key: &str) -> Error {
        Error::validation(self.path, format!("missing required field '{}'", key))
    }

    fn type_error(&self, key: &str, expected: &str, found: &Value) -> Error {
        Error::validation(
            self.field_path(key),
            format!("expected {}, found {}", expected, describe(found)),
        )
    }
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Short description of a YAML value for error messages.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_typed_getters() {
        let value = yaml("text: hello\nsize: 14\nborder: true\nyear: 2024\n");
        let fields = Fields::new(&value, "content[0].paragraph").unwrap();

        assert_eq!(fields.text("text").unwrap(), Some("hello".to_string()));
        assert_eq!(fields.text("year").unwrap(), Some("2024".to_string()));
        assert_eq!(fields.number("size").unwrap(), Some(14.0));
        assert_eq!(fields.bool("border").unwrap(), Some(true));
        assert_eq!(fields.number("missing").unwrap(), None);
    }

    #[test]
    fn test_type_errors_carry_field_path() {
        let value = yaml("size: big\nborder: 3\n");
        let fields = Fields::new(&value, "content[1].table").unwrap();

        let err = fields.number("size").unwrap_err();
        assert_eq!(err.path(), Some("content[1].table.size"));
        assert!(err.to_string().contains("expected a number"));

        let err = fields.bool("border").unwrap_err();
        assert_eq!(err.path(), Some("content[1].table.border"));
    }

    #[test]
    fn test_check_keys() {
        let value = yaml("text: a\ncolour: red\n");
        let fields = Fields::new(&value, "p").unwrap();
        assert!(fields.check_keys(&["text", "colour"]).is_ok());
        let err = fields.check_keys(&["text"]).unwrap_err();
        assert_eq!(err.path(), Some("p.colour"));
    }

    #[test]
    fn test_placement_alignment_error() {
        let value = yaml("alignment: diagonal\n");
        let fields = Fields::new(&value, "content[0].image").unwrap();
        let err = fields.placement().unwrap_err();
        assert_eq!(err.path(), Some("content[0].image.alignment"));
    }

    #[test]
    fn test_null_is_absent() {
        let value = yaml("text: ~\n");
        let fields = Fields::new(&value, "p").unwrap();
        assert!(!fields.contains("text"));
        assert!(fields.required_text("text").is_err());
    }

    #[test]
    fn test_non_mapping_rejected() {
        let value = yaml("[1, 2]");
        assert!(Fields::new(&value, "p").is_err());
    }
}
