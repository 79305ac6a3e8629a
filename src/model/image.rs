//! Image element.

use super::style::{positive, Placement};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// An image drawn from a file on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Path of the image file, never substituted
    pub resource: String,

    /// Requested width in points (natural size if absent)
    pub width: Option<f32>,

    /// Requested height in points (natural size if absent)
    pub height: Option<f32>,

    /// Alignment and margins
    #[serde(flatten)]
    pub placement: Placement,
}

impl Image {
    /// Create an image at its natural size.
    pub fn new(resource: impl Into<String>) -> Result<Self> {
        Self::with_options(resource, None, None, Placement::default())
    }

    /// Create an image with explicit size and placement.
    pub fn with_options(
        resource: impl Into<String>,
        width: Option<f32>,
        height: Option<f32>,
        placement: Placement,
    ) -> Result<Self> {
        let resource = resource.into();
        if resource.trim().is_empty() {
            return Err(Error::validation("resource", "missing required field 'resource'"));
        }
        if let Some(w) = width {
            positive("width", w)?;
        }
        if let Some(h) = height {
            positive("height", h)?;
        }
        placement.validate()?;
        Ok(Self {
            resource,
            width,
            height,
            placement,
        })
    }

    /// Resolve the drawn size from the natural size of the decoded image.
    ///
    /// When only one dimension is given the other keeps the aspect ratio.
    pub fn resolve_size(&self, natural_width: f32, natural_height: f32) -> (f32, f32) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if natural_width > 0.0 => (w, natural_height * w / natural_width),
            (None, Some(h)) if natural_height > 0.0 => (natural_width * h / natural_height, h),
            (Some(w), None) => (w, natural_height),
            (None, Some(h)) => (natural_width, h),
            (None, None) => (natural_width, natural_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_requires_resource() {
        let err = Image::new("").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("resource"));
    }

    #[test]
    fn test_image_rejects_non_positive_size() {
        let err =
            Image::with_options("a.png", Some(0.0), None, Placement::default()).unwrap_err();
        assert_eq!(err.path(), Some("width"));
        let err =
            Image::with_options("a.png", None, Some(-5.0), Placement::default()).unwrap_err();
        assert_eq!(err.path(), Some("height"));
    }

    #[test]
    fn test_resolve_size() {
        let natural = Image::new("a.png").unwrap();
        assert_eq!(natural.resolve_size(200.0, 100.0), (200.0, 100.0));

        let fixed =
            Image::with_options("a.png", Some(50.0), Some(60.0), Placement::default()).unwrap();
        assert_eq!(fixed.resolve_size(200.0, 100.0), (50.0, 60.0));

        let width_only =
            Image::with_options("a.png", Some(100.0), None, Placement::default()).unwrap();
        assert_eq!(width_only.resolve_size(200.0, 100.0), (100.0, 50.0));

        let height_only =
            Image::with_options("a.png", None, Some(25.0), Placement::default()).unwrap();
        assert_eq!(height_only.resolve_size(200.0, 100.0), (50.0, 25.0));
    }
}
