//! Rendering
//!
//! CPU rasterization into a [`PixelBuffer`], the [`Presenter`] seam that
//! moves finished frames to the screen, and the two concrete presenters:
//! [`SoftwareCompositor`] and the Vulkan swapchain presenter built on it.

pub mod compositor;
pub mod pixel_buffer;
pub mod presenter;
pub mod starfield;
pub mod text;
pub mod vulkan;

pub use compositor::SoftwareCompositor;
pub use pixel_buffer::PixelBuffer;
pub use presenter::{Presenter, Rect, RenderError, RenderResult, SurfaceHandle, TextureHandle};
pub use starfield::{LayerSpec, Particle, ParticleLayer, STAR_LAYERS};
pub use text::{BitmapFont, FontError, GlyphAtlas, TextBanner};
