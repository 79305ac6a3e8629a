//! Build options and configuration.

use crate::variables::VariableMap;

/// Options for building a document from its YAML description.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Variables substituted into text fields
    pub variables: VariableMap,

    /// Whether a `variables:` section in the document supplies defaults
    pub document_variables: bool,
}

impl BuildOptions {
    /// Create new build options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the variable map.
    pub fn with_variables(mut self, variables: VariableMap) -> Self {
        self.variables = variables;
        self
    }

    /// Set one variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key, value);
        self
    }

    /// Ignore the document's own `variables:` section.
    pub fn without_document_variables(mut self) -> Self {
        self.document_variables = false;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            variables: VariableMap::new(),
            document_variables: true,
        }
    }
}
