//! Error types for pdfgen library.

use std::io;
use thiserror::Error;

/// Result type alias for pdfgen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or rendering a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not well-formed YAML.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An element key that no constructor is registered for.
    #[error("{path}: unsupported element '{key}'")]
    UnsupportedElement {
        /// The offending key
        key: String,
        /// Location of the key in the document
        path: String,
    },

    /// A missing required field or an out-of-range attribute.
    #[error("{path}: {message}")]
    Validation {
        /// Location of the offending field
        path: String,
        /// What is wrong with it
        message: String,
    },

    /// An image resource could not be read or decoded.
    #[error("Resource error: {path}: {message}")]
    Resource {
        /// The resource path as written in the document
        path: String,
        /// Underlying cause
        message: String,
    },

    /// Error during layout or PDF serialization.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error for the given path.
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported-element error for the given key and path.
    pub fn unsupported(key: impl Into<String>, path: impl Into<String>) -> Self {
        Error::UnsupportedElement {
            key: key.into(),
            path: path.into(),
        }
    }

    /// Create a resource error for the given resource path.
    pub fn resource(path: impl Into<String>, message: impl ToString) -> Self {
        Error::Resource {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Re-root a build error under `prefix`.
    ///
    /// Model constructors report paths relative to the element they build;
    /// the builder prefixes them with the element's location. Other errors
    /// pass through unchanged.
    pub fn within(self, prefix: &str) -> Self {
        let join = |path: String| {
            if path.is_empty() {
                prefix.to_string()
            } else if prefix.is_empty() || path.starts_with('[') {
                format!("{}{}", prefix, path)
            } else {
                format!("{}.{}", prefix, path)
            }
        };
        match self {
            Error::Validation { path, message } => Error::Validation {
                path: join(path),
                message,
            },
            Error::UnsupportedElement { key, path } => Error::UnsupportedElement {
                key,
                path: join(path),
            },
            other => other,
        }
    }

    /// Path of the offending element, for errors detected while building.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::UnsupportedElement { path, .. } | Error::Validation { path, .. } => {
                Some(path.as_str())
            }
            _ => None,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Render(err.to_string()),
        }
    }
}
