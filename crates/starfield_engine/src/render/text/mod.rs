//! Bitmap font text
//!
//! A [`BitmapFont`] pairs the glyph atlas with the presenter texture holding
//! the font image. Banners borrow it at draw time, so any number of banners
//! share one decoded font.

pub mod banner;
pub mod glyph_atlas;

pub use banner::TextBanner;
pub use glyph_atlas::{AtlasError, AtlasResult, Glyph, GlyphAtlas};

use std::path::Path;

use thiserror::Error;

use crate::assets::{AssetError, ImageData};
use crate::config::FontGrid;
use crate::render::presenter::{Presenter, RenderError, TextureHandle};

/// Errors raised while loading a bitmap font
#[derive(Error, Debug)]
pub enum FontError {
    /// The font image could not be read or decoded
    #[error("Font image: {0}")]
    Asset(#[from] AssetError),

    /// The glyph grid is malformed or does not fit the image
    #[error("Font atlas: {0}")]
    Atlas(#[from] AtlasError),

    /// The presenter refused the font texture
    #[error("Font texture: {0}")]
    Render(#[from] RenderError),
}

/// Glyph atlas plus the texture its cells are cut from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapFont {
    /// Character to cell mapping
    pub atlas: GlyphAtlas,
    /// Presenter texture holding the font image
    pub texture: TextureHandle,
}

impl BitmapFont {
    /// Pair an atlas with an already created texture
    pub fn new(atlas: GlyphAtlas, texture: TextureHandle) -> Self {
        Self { atlas, texture }
    }

    /// Decode the font image at `path` and register it with `presenter`
    pub fn load<P, Q>(presenter: &mut P, path: Q, grid: &FontGrid) -> Result<Self, FontError>
    where
        P: Presenter + ?Sized,
        Q: AsRef<Path>,
    {
        let path = path.as_ref();
        let image = ImageData::from_file(path)?;
        log::info!("Loaded font image {} ({}x{})", path.display(), image.width, image.height);
        Self::from_image(presenter, &image, grid)
    }

    /// Register decoded font pixels with `presenter` and index the grid
    pub fn from_image<P: Presenter + ?Sized>(
        presenter: &mut P,
        image: &ImageData,
        grid: &FontGrid,
    ) -> Result<Self, FontError> {
        let atlas = GlyphAtlas::build(grid.first_char, grid.rows, grid.cols, grid.cell_width, grid.cell_height)?;
        atlas.validate_texture_size(image.width, image.height)?;

        let texture = presenter.create_texture(image)?;

        let bang = atlas.lookup('!');
        log::debug!(
            "Glyph atlas ready: {} glyphs, '!' at ({}, {})",
            atlas.len(),
            bang.source_x,
            bang.source_y
        );

        Ok(Self::new(atlas, texture))
    }

    /// Glyph cell size in pixels
    pub fn cell_size(&self) -> (u32, u32) {
        self.atlas.cell_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FONT_GRID;
    use crate::render::presenter::testing::{PresenterCall, RecordingPresenter};

    #[test]
    fn test_from_image_registers_texture() {
        let mut presenter = RecordingPresenter::default();
        let image = ImageData::solid_color(320, 192, [255, 255, 255, 255]).unwrap();

        let font = BitmapFont::from_image(&mut presenter, &image, &FONT_GRID).unwrap();

        assert_eq!(font.atlas.len(), 60);
        assert_eq!(font.texture, TextureHandle::new(0));
        assert_eq!(font.cell_size(), (32, 32));
        assert_eq!(presenter.calls, vec![PresenterCall::CreateTexture(320, 192)]);
    }

    #[test]
    fn test_undersized_image_is_rejected_before_upload() {
        let mut presenter = RecordingPresenter::default();
        let image = ImageData::solid_color(256, 192, [0, 0, 0, 0]).unwrap();

        let result = BitmapFont::from_image(&mut presenter, &image, &FONT_GRID);

        assert!(matches!(result, Err(FontError::Atlas(AtlasError::TextureTooSmall { .. }))));
        assert!(presenter.calls.is_empty());
    }

    #[test]
    fn test_missing_font_file_is_an_asset_error() {
        let mut presenter = RecordingPresenter::default();

        let result = BitmapFont::load(&mut presenter, "no/such/font.png", &FONT_GRID);

        assert!(matches!(result, Err(FontError::Asset(AssetError::NotFound(_)))));
    }
}
