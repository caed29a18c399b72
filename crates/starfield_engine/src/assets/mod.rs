//! Asset loading
//!
//! The only asset the display needs is the bitmap font image, decoded once at
//! startup. Any failure here is fatal: there is no fallback font.

pub mod image_loader;

pub use image_loader::ImageData;

use thiserror::Error;

/// Asset system errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
