//! Text-variable substitution.
//!
//! Text fields may contain `<name>` placeholders. A [`VariableMap`] replaces
//! every placeholder whose name it knows and leaves the others untouched, so
//! a missing variable never fails a build.
//!
//! Substitution is a single left-to-right pass: at each position the longest
//! known placeholder wins, and replacement values are not scanned again.

use crate::error::{Error, Result};
use aho_corasick::{AhoCorasick, MatchKind};
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Mapping from variable name to substitution value.
#[derive(Debug, Clone, Default)]
pub struct VariableMap {
    values: BTreeMap<String, String>,
    /// Placeholder matcher, built on first use and reset by every change.
    matcher: OnceLock<Option<AhoCorasick>>,
}

impl VariableMap {
    /// Create an empty map. Substituting with it is the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map from key/value pairs. Later duplicates win.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_values(values)
    }

    fn from_values(values: BTreeMap<String, String>) -> Self {
        Self {
            values,
            matcher: OnceLock::new(),
        }
    }

    /// Insert a variable, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
        self.matcher = OnceLock::new();
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add every variable of `other`, replacing values already set here.
    pub fn merge(&mut self, other: &VariableMap) {
        if other.is_empty() {
            return;
        }
        self.values
            .extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.matcher = OnceLock::new();
    }

    /// Add every variable of `other` that is not already set here.
    pub fn merge_defaults(&mut self, other: &VariableMap) {
        let mut changed = false;
        for (key, value) in &other.values {
            if !self.values.contains_key(key) {
                self.values.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        if changed {
            self.matcher = OnceLock::new();
        }
    }

    /// Get the value of a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the map has no variables.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a `key=value` assignment, as given on the command line.
    ///
    /// Only the first `=` separates key and value.
    pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
        match assignment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(Error::validation(
                "variables",
                format!("expected key=value, got '{}'", assignment),
            )),
        }
    }

    /// Load variables from a flat YAML mapping of scalars.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        match value {
            Value::Null => Ok(Self::new()),
            Value::Mapping(mapping) => Self::from_mapping(&mapping, "variables"),
            _ => Err(Error::validation("variables", "expected a mapping")),
        }
    }

    /// Load variables from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Read variables from a parsed YAML mapping. Nested values are rejected.
    pub(crate) fn from_mapping(mapping: &Mapping, path: &str) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (key, value) in mapping {
            let key = scalar_to_string(key)
                .ok_or_else(|| Error::validation(path, "variable names must be scalars"))?;
            let value = scalar_to_string(value).ok_or_else(|| {
                Error::validation(format!("{}.{}", path, key), "value must be a scalar")
            })?;
            values.insert(key, value);
        }
        Ok(Self::from_values(values))
    }

    /// Replace every known `<key>` placeholder in `text`.
    ///
    /// Borrows the input unchanged when nothing matched.
    pub fn substitute<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let Some(matcher) = self.matcher() else {
            return Cow::Borrowed(text);
        };

        let mut output: Option<String> = None;
        let mut last = 0;
        for m in matcher.find_iter(text) {
            // every pattern is `<key>` for a key of the map
            let key = &text[m.start() + 1..m.end() - 1];
            let Some(value) = self.values.get(key) else {
                continue;
            };
            let buffer = output.get_or_insert_with(|| String::with_capacity(text.len()));
            buffer.push_str(&text[last..m.start()]);
            buffer.push_str(value);
            last = m.end();
        }

        match output {
            Some(mut buffer) => {
                buffer.push_str(&text[last..]);
                Cow::Owned(buffer)
            }
            None => Cow::Borrowed(text),
        }
    }

    fn matcher(&self) -> Option<&AhoCorasick> {
        self.matcher
            .get_or_init(|| compile_matcher(&self.values))
            .as_ref()
    }
}

impl PartialEq for VariableMap {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

/// Automaton over every `<key>` placeholder. Leftmost-longest matching
/// makes the longest key win among placeholders starting at one position.
fn compile_matcher(values: &BTreeMap<String, String>) -> Option<AhoCorasick> {
    if values.is_empty() {
        return None;
    }
    let placeholders = values.keys().map(|key| format!("<{}>", key));
    match AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(placeholders)
    {
        Ok(matcher) => Some(matcher),
        Err(e) => {
            log::error!(
                "Cannot build placeholder matcher for {} variables: {}",
                values.len(),
                e
            );
            None
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Substitute the text fields of a parsed document tree.
///
/// Returns a transformed copy of `tree` in which the `text` of every
/// paragraph and table cell has been substituted. Nothing else is touched,
/// in particular image `resource` paths. Shapes the builder would reject are
/// copied unchanged and reported later by the builder.
pub fn load_variables(tree: &Value, variables: &VariableMap) -> Value {
    let mut tree = tree.clone();
    if variables.is_empty() {
        return tree;
    }
    match &mut tree {
        Value::Sequence(items) => substitute_entries(items, variables),
        Value::Mapping(mapping) => {
            for (key, value) in mapping.iter_mut() {
                match (key.as_str(), value) {
                    (Some("content"), Value::Sequence(items)) => {
                        substitute_entries(items, variables)
                    }
                    (key, value) => substitute_element(key, value, variables),
                }
            }
        }
        _ => {}
    }
    tree
}

fn substitute_entries(items: &mut [Value], variables: &VariableMap) {
    for item in items {
        if let Value::Mapping(entry) = item {
            for (key, value) in entry.iter_mut() {
                substitute_element(key.as_str(), value, variables);
            }
        }
    }
}

fn substitute_element(key: Option<&str>, value: &mut Value, variables: &VariableMap) {
    match key {
        Some("paragraph") => substitute_text_field(value, variables),
        Some("table") => {
            let rows = value
                .as_mapping_mut()
                .and_then(|t| t.get_mut("rows"))
                .and_then(Value::as_sequence_mut);
            for row in rows.into_iter().flatten() {
                let cells = row
                    .as_mapping_mut()
                    .and_then(|r| r.get_mut("row"))
                    .and_then(Value::as_sequence_mut);
                for cell in cells.into_iter().flatten() {
                    substitute_text_field(cell, variables);
                }
            }
        }
        _ => {}
    }
}

fn substitute_text_field(value: &mut Value, variables: &VariableMap) {
    match value {
        Value::String(text) => *text = variables.substitute(text).into_owned(),
        Value::Mapping(mapping) => {
            if let Some(Value::String(text)) = mapping.get_mut("text") {
                *text = variables.substitute(text).into_owned();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_serial_number() {
        let vars = VariableMap::new().with("serial_number", "123456789");
        assert_eq!(
            vars.substitute("Incubator - UDI (S/N: <serial_number>)"),
            "Incubator - UDI (S/N: 123456789)"
        );
    }

    #[test]
    fn test_unknown_placeholder_left_literal() {
        let vars = VariableMap::new();
        assert_eq!(vars.substitute("<unknown_var>"), "<unknown_var>");

        let vars = VariableMap::new().with("known", "x");
        assert_eq!(vars.substitute("<known> <unknown_var>"), "x <unknown_var>");
    }

    #[test]
    fn test_identity_without_placeholders() {
        let vars = VariableMap::from_pairs([("a", "1"), ("b", "2")]);
        let text = "No placeholders a b <> < a > here";
        assert!(matches!(vars.substitute(text), Cow::Borrowed(_)));
        assert_eq!(vars.substitute(text), text);
    }

    #[test]
    fn test_multiple_and_repeated_placeholders() {
        let vars = VariableMap::from_pairs([("first", "Ada"), ("last", "Lovelace")]);
        assert_eq!(
            vars.substitute("<first> <last>, <first>!"),
            "Ada Lovelace, Ada!"
        );
    }

    #[test]
    fn test_longest_key_wins() {
        // "a" and "a>b" collide on "<a>b>"
        let vars = VariableMap::from_pairs([("a", "short"), ("a>b", "long")]);
        assert_eq!(vars.substitute("<a>b>"), "long");
        assert_eq!(vars.substitute("<a>"), "short");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let vars = VariableMap::from_pairs([("outer", "<inner>"), ("inner", "deep")]);
        let once = vars.substitute("<outer>").into_owned();
        assert_eq!(once, "<inner>");
        // Known non-round-trip case: a value containing a placeholder.
        assert_eq!(vars.substitute(&once), "deep");
    }

    #[test]
    fn test_resubstitution_is_idempotent_for_plain_values() {
        let vars = VariableMap::from_pairs([("name", "Widget"), ("id", "42")]);
        let once = vars.substitute("<name> #<id>").into_owned();
        let twice = vars.substitute(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_large_map_substitutes_every_key() {
        let vars: VariableMap = (0..20_000)
            .map(|i| (format!("variable_name_{:08}", i), format!("v{}", i)))
            .collect();
        assert_eq!(
            vars.substitute("S/N: <variable_name_00000007>"),
            "S/N: v7"
        );
        assert_eq!(
            vars.substitute("<variable_name_00019999>/<variable_name_00020000>"),
            "v19999/<variable_name_00020000>"
        );
    }

    #[test]
    fn test_insert_one_at_a_time() {
        let mut vars = VariableMap::new();
        for i in 0..20_000 {
            vars.insert(format!("key_{}", i), i.to_string());
        }
        assert_eq!(vars.len(), 20_000);
        assert_eq!(vars.substitute("<key_0> <key_19999>"), "0 19999");

        // changes after the first substitution are picked up
        vars.insert("key_0", "zero");
        assert_eq!(vars.substitute("<key_0>"), "zero");
    }

    #[test]
    fn test_merge_overrides() {
        let mut vars = VariableMap::from_pairs([("a", "old"), ("b", "kept")]);
        assert_eq!(vars.substitute("<a>"), "old");
        vars.merge(&VariableMap::from_pairs([("a", "new"), ("c", "added")]));
        assert_eq!(vars.substitute("<a> <b> <c>"), "new kept added");
    }

    #[test]
    fn test_special_characters_in_keys() {
        let vars = VariableMap::new().with("price.$", "9.99");
        assert_eq!(vars.substitute("Cost: <price.$>"), "Cost: 9.99");
        assert_eq!(vars.substitute("Cost: <priceX$>"), "Cost: <priceX$>");
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            VariableMap::parse_assignment("key=value").unwrap(),
            ("key".to_string(), "value".to_string())
        );
        assert_eq!(
            VariableMap::parse_assignment("eq=a=b").unwrap(),
            ("eq".to_string(), "a=b".to_string())
        );
        assert!(VariableMap::parse_assignment("novalue").is_err());
        assert!(VariableMap::parse_assignment("=value").is_err());
    }

    #[test]
    fn test_from_yaml_str() {
        let vars = VariableMap::from_yaml_str("serial: 123\nname: Unit\nactive: true\n").unwrap();
        assert_eq!(vars.get("serial"), Some("123"));
        assert_eq!(vars.get("name"), Some("Unit"));
        assert_eq!(vars.get("active"), Some("true"));
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_from_yaml_rejects_nesting() {
        let err = VariableMap::from_yaml_str("outer:\n  inner: 1\n").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("variables.outer"));
    }

    #[test]
    fn test_merge_defaults_keeps_existing() {
        let mut vars = VariableMap::new().with("a", "caller");
        let defaults = VariableMap::from_pairs([("a", "default"), ("b", "default")]);
        vars.merge_defaults(&defaults);
        assert_eq!(vars.get("a"), Some("caller"));
        assert_eq!(vars.get("b"), Some("default"));
        assert_eq!(vars.substitute("<a>/<b>"), "caller/default");
    }

    #[test]
    fn test_load_variables_only_touches_text() {
        let tree: Value = serde_yaml::from_str(
            r#"
- paragraph:
    text: "S/N: <sn>"
- paragraph: "<sn>"
- image:
    resource: "<sn>.png"
- table:
    rows:
      - row:
          - text: "<sn>"
          - image:
              resource: "<sn>.png"
"#,
        )
        .unwrap();
        let vars = VariableMap::new().with("sn", "42");
        let out = load_variables(&tree, &vars);

        assert_eq!(out[0]["paragraph"]["text"], Value::from("S/N: 42"));
        assert_eq!(out[1]["paragraph"], Value::from("42"));
        assert_eq!(out[2]["image"]["resource"], Value::from("<sn>.png"));
        let row = &out[3]["table"]["rows"][0]["row"];
        assert_eq!(row[0]["text"], Value::from("42"));
        assert_eq!(row[1]["image"]["resource"], Value::from("<sn>.png"));
    }
}
