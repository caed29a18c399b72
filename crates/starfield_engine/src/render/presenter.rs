//! Presentation collaborator interface
//!
//! The frame driver never talks to a window or a GPU directly. It uploads the
//! finished pixel buffer to a surface, composites that surface onto the
//! output target, asks for glyph blits on top and finally presents. Anything
//! that can do those five things can display the starfield.

use thiserror::Error;

use crate::assets::ImageData;

/// Result type for presentation operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised by a presenter
#[derive(Error, Debug)]
pub enum RenderError {
    /// Surface handle was never created by this presenter
    #[error("Unknown surface: {0:?}")]
    UnknownSurface(SurfaceHandle),

    /// Texture handle was never created by this presenter
    #[error("Unknown texture: {0:?}")]
    UnknownTexture(TextureHandle),

    /// Uploaded pixel data does not cover the surface
    #[error("Pixel upload too small: need {required} bytes at stride {stride}, got {actual}")]
    BufferTooSmall {
        /// Bytes needed for the surface at the given stride
        required: usize,
        /// Row stride in bytes
        stride: usize,
        /// Bytes actually supplied
        actual: usize,
    },

    /// Failure inside the concrete windowing/graphics backend
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Opaque handle to a streaming pixel surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(u32);

impl SurfaceHandle {
    /// Wrap a presenter-assigned index
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Presenter-assigned index
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Opaque handle to a blittable, alpha-blended texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// Wrap a presenter-assigned index
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Presenter-assigned index
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Axis-aligned pixel rectangle
///
/// Destination rectangles may start off-target; presenters clip them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Create a rectangle
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Window/graphics backend as seen by the frame driver
pub trait Presenter {
    /// Create a `width` x `height` RGBA surface for streaming pixel uploads
    fn create_surface(&mut self, width: u32, height: u32) -> RenderResult<SurfaceHandle>;

    /// Register decoded image data as a texture usable by [`Presenter::blit`]
    fn create_texture(&mut self, image: &ImageData) -> RenderResult<TextureHandle>;

    /// Replace the contents of `surface` with `pixels`, `stride` bytes per row
    fn upload_pixels(&mut self, surface: SurfaceHandle, pixels: &[u8], stride: usize) -> RenderResult<()>;

    /// Copy `surface` over the whole output target
    fn composite(&mut self, surface: SurfaceHandle) -> RenderResult<()>;

    /// Alpha-blend `src` of `texture` onto the output target at `dst`
    fn blit(&mut self, texture: TextureHandle, src: Rect, dst: Rect) -> RenderResult<()>;

    /// Show the composited output target
    fn present(&mut self) -> RenderResult<()>;
}
