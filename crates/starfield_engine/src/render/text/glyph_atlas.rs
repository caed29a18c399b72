//! Fixed-grid glyph atlas
//!
//! The font image is a regular grid of equally sized cells. Cell `i`, counted
//! row-major from the top-left, holds character `first_char + i`. Lookups
//! never fail: an unmapped character gets the first glyph in the atlas.

use thiserror::Error;

use crate::render::presenter::Rect;

/// Result type for atlas operations
pub type AtlasResult<T> = Result<T, AtlasError>;

/// Errors that can occur while building a glyph atlas
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AtlasError {
    /// The grid has no cells, so there is no default glyph
    #[error("Glyph grid {rows}x{cols} has no cells")]
    EmptyGrid {
        /// Requested rows
        rows: u32,
        /// Requested columns
        cols: u32,
    },

    /// A cell would map to something that is not a Unicode scalar value
    #[error("Cell {cell} maps to invalid code point {code:#x}")]
    InvalidCodePoint {
        /// Row-major cell index
        cell: u32,
        /// Offending code point
        code: u32,
    },

    /// The grid extends past the edges of the font image
    #[error("Glyph grid needs {required_width}x{required_height} pixels, font image is {width}x{height}")]
    TextureTooSmall {
        /// Width covered by the grid
        required_width: u32,
        /// Height covered by the grid
        required_height: u32,
        /// Font image width
        width: u32,
        /// Font image height
        height: u32,
    },
}

/// One character cell in the font image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    /// Character drawn by this cell
    pub character: char,
    /// Left edge of the cell in the font image
    pub source_x: u32,
    /// Top edge of the cell in the font image
    pub source_y: u32,
}

/// Ordered glyphs sharing one cell size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphAtlas {
    glyphs: Vec<Glyph>,
    cell_width: u32,
    cell_height: u32,
    rows: u32,
    cols: u32,
}

impl GlyphAtlas {
    /// Scan a `rows` x `cols` grid, assigning codes from `first_char` upward
    pub fn build(first_char: u32, rows: u32, cols: u32, cell_width: u32, cell_height: u32) -> AtlasResult<Self> {
        let count = rows.checked_mul(cols).unwrap_or(0);
        if count == 0 {
            return Err(AtlasError::EmptyGrid { rows, cols });
        }

        let glyphs = (0..count)
            .map(|cell| {
                let code = first_char
                    .checked_add(cell)
                    .ok_or(AtlasError::InvalidCodePoint { cell, code: u32::MAX })?;
                let character = char::from_u32(code).ok_or(AtlasError::InvalidCodePoint { cell, code })?;
                Ok(Glyph {
                    character,
                    source_x: (cell % cols) * cell_width,
                    source_y: (cell / cols) * cell_height,
                })
            })
            .collect::<AtlasResult<Vec<_>>>()?;

        Ok(Self {
            glyphs,
            cell_width,
            cell_height,
            rows,
            cols,
        })
    }

    /// Glyph for `character`, or the first glyph if it is not mapped
    pub fn lookup(&self, character: char) -> &Glyph {
        self.glyphs
            .iter()
            .find(|glyph| glyph.character == character)
            .unwrap_or(&self.glyphs[0])
    }

    /// Source rectangle of `glyph` at the atlas cell size
    pub fn source_rect(&self, glyph: &Glyph) -> Rect {
        Rect::new(glyph.source_x as i32, glyph.source_y as i32, self.cell_width, self.cell_height)
    }

    /// Check that the grid fits inside a `width` x `height` font image
    pub fn validate_texture_size(&self, width: u32, height: u32) -> AtlasResult<()> {
        let required_width = self.cols.checked_mul(self.cell_width).unwrap_or(u32::MAX);
        let required_height = self.rows.checked_mul(self.cell_height).unwrap_or(u32::MAX);
        if required_width > width || required_height > height {
            return Err(AtlasError::TextureTooSmall {
                required_width,
                required_height,
                width,
                height,
            });
        }
        Ok(())
    }

    /// All glyphs in cell order
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Number of glyphs
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always false; a built atlas has at least one glyph
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Cell size in pixels
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font_grid() -> GlyphAtlas {
        GlyphAtlas::build(32, 6, 10, 32, 32).unwrap()
    }

    #[test]
    fn test_build_covers_every_cell() {
        let atlas = font_grid();

        assert_eq!(atlas.len(), 60);
        assert_eq!(atlas.glyphs()[0].character, ' ');
        assert_eq!(atlas.glyphs()[59].character, '[');
        assert_eq!(atlas.cell_size(), (32, 32));
    }

    #[test]
    fn test_cells_are_row_major() {
        let atlas = font_grid();

        let bang = atlas.lookup('!');
        assert_eq!((bang.source_x, bang.source_y), (32, 0));

        // Code 42 is the first cell of the second row
        let star = atlas.lookup('*');
        assert_eq!((star.source_x, star.source_y), (0, 32));

        let last = atlas.lookup('[');
        assert_eq!((last.source_x, last.source_y), (9 * 32, 5 * 32));
    }

    #[test]
    fn test_unmapped_characters_fall_back_to_first_glyph() {
        let atlas = font_grid();
        let space = *atlas.lookup(' ');

        for missing in ['\\', 'a', '~', '\u{1F680}', '\0', '\u{1F}'] {
            assert!(atlas.glyphs().iter().all(|glyph| glyph.character != missing));
            assert_eq!(*atlas.lookup(missing), space);
        }
    }

    #[test]
    fn test_source_rect_uses_cell_size() {
        let atlas = GlyphAtlas::build(65, 2, 3, 8, 12).unwrap();
        let glyph = atlas.lookup('E');

        assert_eq!(atlas.source_rect(glyph), Rect::new(8, 12, 8, 12));
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        assert_eq!(
            GlyphAtlas::build(32, 0, 10, 32, 32),
            Err(AtlasError::EmptyGrid { rows: 0, cols: 10 })
        );
    }

    #[test]
    fn test_surrogate_codes_are_rejected() {
        let result = GlyphAtlas::build(0xD7FF, 1, 2, 8, 8);
        assert_eq!(result, Err(AtlasError::InvalidCodePoint { cell: 1, code: 0xD800 }));
    }

    #[test]
    fn test_texture_must_cover_the_grid() {
        let atlas = font_grid();

        assert!(atlas.validate_texture_size(320, 192).is_ok());
        assert!(atlas.validate_texture_size(512, 512).is_ok());
        assert_eq!(
            atlas.validate_texture_size(320, 160),
            Err(AtlasError::TextureTooSmall {
                required_width: 320,
                required_height: 192,
                width: 320,
                height: 160,
            })
        );
    }

    #[test]
    fn test_oversized_grid_reports_too_small() {
        let atlas = GlyphAtlas::build(32, 1, 2, u32::MAX / 2 + 1, 8).unwrap();

        assert_eq!(
            atlas.validate_texture_size(4096, 4096),
            Err(AtlasError::TextureTooSmall {
                required_width: u32::MAX,
                required_height: 8,
                width: 4096,
                height: 4096,
            })
        );
    }
}
