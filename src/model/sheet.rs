//! Page geometry.

use super::style::{non_negative, positive};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Page size and margins of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Paper size
    pub size: PageSize,

    /// Page orientation
    pub orientation: Orientation,

    /// Page margins in points
    pub margin: Margins,
}

impl Sheet {
    /// Page width and height in points, orientation applied.
    pub fn dimensions(&self) -> (f32, f32) {
        let (w, h) = self.size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w.min(h), w.max(h)),
            Orientation::Landscape => (w.max(h), w.min(h)),
        }
    }

    /// Width of the area inside the margins.
    pub fn frame_width(&self) -> f32 {
        self.dimensions().0 - self.margin.left - self.margin.right
    }

    /// Height of the area inside the margins.
    pub fn frame_height(&self) -> f32 {
        self.dimensions().1 - self.margin.top - self.margin.bottom
    }

    /// Check that the margins leave a usable frame.
    pub fn validate(&self) -> Result<()> {
        if let PageSize::Custom { width, height } = self.size {
            positive("size.width", width)?;
            positive("size.height", height)?;
        }
        self.margin.validate()?;
        if self.frame_width() <= 0.0 || self.frame_height() <= 0.0 {
            return Err(Error::validation("margin", "margins leave no room for content"));
        }
        Ok(())
    }
}

/// Paper size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// ISO A3
    A3,
    /// ISO A4 (default)
    #[default]
    A4,
    /// ISO A5
    A5,
    /// US Letter
    Letter,
    /// US Legal
    Legal,
    /// Explicit size in points
    Custom {
        /// Width in points
        width: f32,
        /// Height in points
        height: f32,
    },
}

impl PageSize {
    /// Width and height in points (1 point = 1/72 inch).
    pub fn dimensions(&self) -> (f32, f32) {
        match *self {
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (width, height),
        }
    }
}

impl FromStr for PageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a3" => Ok(PageSize::A3),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            _ => Err(Error::validation(
                "size",
                format!("unknown page size '{}' (expected A3, A4, A5, letter, legal or [width, height])", s),
            )),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Taller than wide (default)
    #[default]
    Portrait,
    /// Wider than tall
    Landscape,
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(Error::validation(
                "orientation",
                format!("invalid orientation '{}' (expected portrait or landscape)", s),
            )),
        }
    }
}

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    /// Top margin
    pub top: f32,
    /// Bottom margin
    pub bottom: f32,
    /// Left margin
    pub left: f32,
    /// Right margin
    pub right: f32,
}

impl Margins {
    /// Same margin on every side.
    pub fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }

    /// Check that every margin is non-negative.
    pub fn validate(&self) -> Result<()> {
        non_negative("margin.top", self.top)?;
        non_negative("margin.bottom", self.bottom)?;
        non_negative("margin.left", self.left)?;
        non_negative("margin.right", self.right)
    }
}

impl Default for Margins {
    /// One inch on every side.
    fn default() -> Self {
        Self::uniform(72.0)
    }
}
