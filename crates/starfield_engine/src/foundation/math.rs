//! Math utilities and types
//!
//! Positions and velocities are nalgebra vectors; colors are plain RGB triples.

pub use nalgebra::Vector3;

/// 3D vector type used for positions and velocities
pub type Vec3 = Vector3<f32>;

/// Opaque RGB color
///
/// No alpha is stored. Particle writes leave the destination alpha byte alone
/// and glyph blits take their alpha from the font texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Pure black
    pub const BLACK: Self = Self::grey(0);

    /// Pure white
    pub const WHITE: Self = Self::grey(255);

    /// Create a color from its three channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a neutral grey with every channel set to `level`
    pub const fn grey(level: u8) -> Self {
        Self::new(level, level, level)
    }
}
