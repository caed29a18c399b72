//! Image loading utilities for texture data
//!
//! Decodes PNG files into tightly packed RGBA8 pixels ready to be registered
//! as a blittable texture.

use std::path::Path;
use crate::assets::AssetError;

/// Decoded image data in RGBA8 layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw RGBA pixel data, row-major, no padding
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {:?}", path_ref);

        if !path_ref.exists() {
            return Err(AssetError::NotFound(path_ref.display().to_string()));
        }

        let img = image::open(path_ref)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image {}: {}", path_ref.display(), e)))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::info!("Loaded image {}x{} from {:?}", width, height, path_ref);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Load image from memory (useful for embedded resources)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to load image from bytes: {}", e)))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::debug!("Loaded image {}x{} from memory", width, height);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Wrap already-decoded RGBA8 pixels
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, AssetError> {
        let expected = Self::byte_len(width, height)?;
        if data.len() != expected {
            return Err(AssetError::InvalidData(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }

        Ok(Self { data, width, height })
    }

    /// Create a solid color image (useful for testing and defaults)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Result<Self, AssetError> {
        let pixel_count = Self::byte_len(width, height)? / 4;
        Ok(Self {
            data: color.repeat(pixel_count),
            width,
            height,
        })
    }

    fn byte_len(width: u32, height: u32) -> Result<usize, AssetError> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| AssetError::InvalidData(format!("{}x{} RGBA image is too large", width, height)))
    }

    /// RGBA value of the pixel at `(x, y)`, or `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let texel = self.data.get(offset..offset + 4)?;
        Some([texel[0], texel[1], texel[2], texel[3]])
    }

    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}
