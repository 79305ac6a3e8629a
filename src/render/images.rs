//! Image resources: loading, decoding and caching by resource path.

use crate::error::{Error, Result};
use crate::model::Document;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A decoded image, flattened onto white and stored as 8-bit RGB.
#[derive(Debug, Clone)]
pub(crate) struct LoadedImage {
    /// XObject name in page resources (`Im1`, `Im2`, ...)
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgb: Vec<u8>,
}

impl LoadedImage {
    /// Natural size in points: one pixel per point.
    pub(crate) fn natural_size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

/// Every image a document refers to, decoded once per resource path.
#[derive(Debug, Default)]
pub(crate) struct ImageStore {
    images: HashMap<String, LoadedImage>,
    order: Vec<String>,
}

impl ImageStore {
    /// Load all images of `doc`. The first unreadable or undecodable file
    /// fails the whole render.
    pub(crate) fn load(doc: &Document, base_dir: Option<&Path>) -> Result<Self> {
        let mut store = Self::default();
        for image in doc.images() {
            if store.images.contains_key(&image.resource) {
                log::debug!("Using cached image for resource: {}", image.resource);
                continue;
            }
            let name = format!("Im{}", store.order.len() + 1);
            let loaded = load_image(&image.resource, base_dir, name)?;
            store.order.push(image.resource.clone());
            store.images.insert(image.resource.clone(), loaded);
        }
        Ok(store)
    }

    pub(crate) fn get(&self, resource: &str) -> Result<&LoadedImage> {
        self.images
            .get(resource)
            .ok_or_else(|| Error::Render(format!("image '{}' was not loaded", resource)))
    }

    /// Images in first-use order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &LoadedImage> {
        self.order.iter().filter_map(|r| self.images.get(r))
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

/// Resolve a resource path against the base directory, if any.
pub(crate) fn resolve_path(resource: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(resource);
    match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

fn load_image(resource: &str, base_dir: Option<&Path>, name: String) -> Result<LoadedImage> {
    let path = resolve_path(resource, base_dir);
    log::info!("Loading image from {}", path.display());

    let bytes = std::fs::read(&path).map_err(|e| Error::resource(resource, e))?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| Error::resource(resource, format!("failed to decode image: {}", e)))?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::resource(resource, "image has no pixels"));
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend([over_white(r, a), over_white(g, a), over_white(b, a)]);
    }

    Ok(LoadedImage {
        name,
        width,
        height,
        rgb,
    })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let c = u32::from(channel);
    let a = u32::from(alpha);
    ((c * a + 255 * (255 - a)) / 255) as u8
}
