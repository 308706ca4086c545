//! The reference image of the target button.

use std::path::{Path, PathBuf};

use image::GrayImage;

use crate::error::{Error, Result};

/// A loaded template, immutable for the lifetime of one run.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    image: GrayImage,
}

impl Template {
    /// Load a template image from disk and convert it to grayscale.
    ///
    /// A missing or unreadable file is a soft error: callers log it and
    /// treat the attempt as a miss, the run keeps going.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Template(format!(
                "template image not found: {}",
                path.display()
            )));
        }
        let image = image::open(path)
            .map_err(|e| Error::Template(format!("failed to read {}: {e}", path.display())))?
            .to_luma8();
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::Template(format!(
                "template image is empty: {}",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            image,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
