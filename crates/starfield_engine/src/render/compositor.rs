//! Software compositor
//!
//! A CPU implementation of [`Presenter`]. Surfaces and textures live in
//! plain byte vectors and the output target is an RGBA frame the caller can
//! read back after [`Presenter::present`]. The Vulkan presenter uses it to
//! build each frame before copying the result to the swapchain, and tests use
//! it to check composition without a GPU.

use crate::assets::ImageData;
use crate::render::pixel_buffer::BYTES_PER_PIXEL;
use crate::render::presenter::{
    Presenter, Rect, RenderError, RenderResult, SurfaceHandle, TextureHandle,
};

/// Streaming surface contents
#[derive(Debug, Clone)]
struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelSurface {
    fn row_bytes(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }
}

/// CPU-side output target plus the surfaces and textures composited onto it
#[derive(Debug, Clone)]
pub struct SoftwareCompositor {
    width: u32,
    height: u32,
    target: Vec<u8>,
    surfaces: Vec<PixelSurface>,
    textures: Vec<ImageData>,
    presented_frames: u64,
}

impl SoftwareCompositor {
    /// Create a compositor with a `width` x `height` output target
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            target: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
            surfaces: Vec::new(),
            textures: Vec::new(),
            presented_frames: 0,
        }
    }

    /// Output target size
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The composited output target, RGBA, tightly packed
    pub fn frame(&self) -> &[u8] {
        &self.target
    }

    /// RGBA at `(x, y)` of the output target
    pub fn frame_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.target[offset..offset + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Number of frames presented so far
    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    fn texture(&self, handle: TextureHandle) -> RenderResult<&ImageData> {
        self.textures
            .get(handle.index() as usize)
            .ok_or(RenderError::UnknownTexture(handle))
    }
}

/// Source-over blend of one channel, rounded
fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let alpha = u32::from(alpha);
    ((u32::from(src) * alpha + u32::from(dst) * (255 - alpha) + 127) / 255) as u8
}

impl Presenter for SoftwareCompositor {
    fn create_surface(&mut self, width: u32, height: u32) -> RenderResult<SurfaceHandle> {
        let handle = SurfaceHandle::new(self.surfaces.len() as u32);
        self.surfaces.push(PixelSurface {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        });
        log::debug!("Created {}x{} streaming surface {:?}", width, height, handle);
        Ok(handle)
    }

    fn create_texture(&mut self, image: &ImageData) -> RenderResult<TextureHandle> {
        let handle = TextureHandle::new(self.textures.len() as u32);
        self.textures.push(image.clone());
        log::debug!("Registered {}x{} texture {:?}", image.width, image.height, handle);
        Ok(handle)
    }

    fn upload_pixels(&mut self, handle: SurfaceHandle, pixels: &[u8], stride: usize) -> RenderResult<()> {
        let surface = self
            .surfaces
            .get_mut(handle.index() as usize)
            .ok_or(RenderError::UnknownSurface(handle))?;

        let row_bytes = surface.row_bytes();
        let rows = surface.height as usize;
        let required = if rows == 0 {
            0
        } else if stride < row_bytes {
            row_bytes * rows
        } else {
            stride * (rows - 1) + row_bytes
        };
        if stride < row_bytes || pixels.len() < required {
            return Err(RenderError::BufferTooSmall {
                required,
                stride,
                actual: pixels.len(),
            });
        }

        for (row, dst) in surface.pixels.chunks_exact_mut(row_bytes.max(1)).enumerate().take(rows) {
            let start = row * stride;
            dst.copy_from_slice(&pixels[start..start + row_bytes]);
        }
        Ok(())
    }

    fn composite(&mut self, handle: SurfaceHandle) -> RenderResult<()> {
        let surface = self
            .surfaces
            .get(handle.index() as usize)
            .ok_or(RenderError::UnknownSurface(handle))?;

        if surface.width == self.width && surface.height == self.height {
            self.target.copy_from_slice(&surface.pixels);
            return Ok(());
        }
        if surface.width == 0 || surface.height == 0 {
            return Ok(());
        }

        // Stretch to the full target, nearest neighbour
        let (width, height) = (self.width as usize, self.height as usize);
        let (src_width, src_height) = (surface.width as usize, surface.height as usize);
        for y in 0..height {
            let sy = y * src_height / height;
            for x in 0..width {
                let sx = x * src_width / width;
                let src = (sy * src_width + sx) * BYTES_PER_PIXEL;
                let dst = (y * width + x) * BYTES_PER_PIXEL;
                self.target[dst..dst + BYTES_PER_PIXEL]
                    .copy_from_slice(&surface.pixels[src..src + BYTES_PER_PIXEL]);
            }
        }
        Ok(())
    }

    fn blit(&mut self, handle: TextureHandle, src: Rect, dst: Rect) -> RenderResult<()> {
        if dst.width == 0 || dst.height == 0 || src.width == 0 || src.height == 0 {
            // Still reject handles this compositor never issued
            self.texture(handle)?;
            return Ok(());
        }

        let texture = self
            .textures
            .get(handle.index() as usize)
            .ok_or(RenderError::UnknownTexture(handle))?;

        for dy in 0..dst.height {
            let ty = i64::from(dst.y) + i64::from(dy);
            if ty < 0 || ty >= i64::from(self.height) {
                continue;
            }
            let sy = i64::from(src.y) + i64::from(dy) * i64::from(src.height) / i64::from(dst.height);
            if sy < 0 {
                continue;
            }

            for dx in 0..dst.width {
                let tx = i64::from(dst.x) + i64::from(dx);
                if tx < 0 || tx >= i64::from(self.width) {
                    continue;
                }
                let sx = i64::from(src.x) + i64::from(dx) * i64::from(src.width) / i64::from(dst.width);
                if sx < 0 {
                    continue;
                }

                let Some([r, g, b, a]) = texture.pixel(sx as u32, sy as u32) else {
                    continue;
                };
                if a == 0 {
                    continue;
                }

                let offset = (ty as usize * self.width as usize + tx as usize) * BYTES_PER_PIXEL;
                let out = &mut self.target[offset..offset + BYTES_PER_PIXEL];
                out[0] = blend_channel(r, out[0], a);
                out[1] = blend_channel(g, out[1], a);
                out[2] = blend_channel(b, out[2], a);
                out[3] = blend_channel(255, out[3], a);
            }
        }
        Ok(())
    }

    fn present(&mut self) -> RenderResult<()> {
        self.presented_frames += 1;
        log::trace!("Presented frame {}", self.presented_frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_texture() -> ImageData {
        // 4x2 texture: left 2x2 cell opaque white, right cell fully transparent
        let mut data = Vec::new();
        for _ in 0..2 {
            data.extend_from_slice(&[255, 255, 255, 255, 255, 255, 255, 255]);
            data.extend_from_slice(&[9, 9, 9, 0, 9, 9, 9, 0]);
        }
        ImageData::from_rgba(4, 2, data).unwrap()
    }

    #[test]
    fn test_upload_then_composite_copies_surface() {
        let mut compositor = SoftwareCompositor::new(4, 2);
        let surface = compositor.create_surface(4, 2).unwrap();
        let pixels: Vec<u8> = (0..32).collect();

        compositor.upload_pixels(surface, &pixels, 16).unwrap();
        compositor.composite(surface).unwrap();

        assert_eq!(compositor.frame(), pixels.as_slice());
    }

    #[test]
    fn test_upload_honours_padded_stride() {
        let mut compositor = SoftwareCompositor::new(2, 2);
        let surface = compositor.create_surface(2, 2).unwrap();
        // Two rows of 8 bytes each, padded to a 12-byte stride
        let mut pixels = vec![1u8; 8];
        pixels.extend_from_slice(&[0xEE; 4]);
        pixels.extend_from_slice(&[2u8; 8]);

        compositor.upload_pixels(surface, &pixels, 12).unwrap();
        compositor.composite(surface).unwrap();

        assert_eq!(compositor.frame_pixel(1, 0), Some([1, 1, 1, 1]));
        assert_eq!(compositor.frame_pixel(0, 1), Some([2, 2, 2, 2]));
    }

    #[test]
    fn test_short_upload_is_rejected() {
        let mut compositor = SoftwareCompositor::new(4, 4);
        let surface = compositor.create_surface(4, 4).unwrap();

        let result = compositor.upload_pixels(surface, &[0; 60], 16);
        assert!(matches!(
            result,
            Err(RenderError::BufferTooSmall { required: 64, stride: 16, actual: 60 })
        ));

        let narrow = compositor.upload_pixels(surface, &[0; 64], 8);
        assert!(matches!(narrow, Err(RenderError::BufferTooSmall { .. })));
    }

    #[test]
    fn test_unknown_handles_are_errors() {
        let mut compositor = SoftwareCompositor::new(4, 4);

        assert!(matches!(
            compositor.composite(SurfaceHandle::new(3)),
            Err(RenderError::UnknownSurface(_))
        ));
        assert!(matches!(
            compositor.blit(TextureHandle::new(0), Rect::new(0, 0, 1, 1), Rect::new(0, 0, 1, 1)),
            Err(RenderError::UnknownTexture(_))
        ));
    }

    #[test]
    fn test_blit_blends_by_texture_alpha() {
        let mut compositor = SoftwareCompositor::new(4, 2);
        let texture = compositor.create_texture(&checker_texture()).unwrap();

        // Opaque cell lands at x=0, transparent cell at x=2
        compositor.blit(texture, Rect::new(0, 0, 2, 2), Rect::new(0, 0, 2, 2)).unwrap();
        compositor.blit(texture, Rect::new(2, 0, 2, 2), Rect::new(2, 0, 2, 2)).unwrap();

        assert_eq!(compositor.frame_pixel(1, 1), Some([255, 255, 255, 255]));
        assert_eq!(compositor.frame_pixel(2, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_half_alpha_mixes_with_background() {
        let mut compositor = SoftwareCompositor::new(1, 1);
        let surface = compositor.create_surface(1, 1).unwrap();
        compositor.upload_pixels(surface, &[100, 0, 200, 0], 4).unwrap();
        compositor.composite(surface).unwrap();

        let glyph = ImageData::from_rgba(1, 1, vec![200, 255, 0, 128]).unwrap();
        let texture = compositor.create_texture(&glyph).unwrap();
        compositor.blit(texture, Rect::new(0, 0, 1, 1), Rect::new(0, 0, 1, 1)).unwrap();

        assert_eq!(compositor.frame_pixel(0, 0), Some([150, 128, 100, 128]));
    }

    #[test]
    fn test_blit_clips_against_target_edges() {
        let mut compositor = SoftwareCompositor::new(4, 2);
        let texture = compositor.create_texture(&ImageData::solid_color(2, 2, [50, 60, 70, 255]).unwrap()).unwrap();

        compositor.blit(texture, Rect::new(0, 0, 2, 2), Rect::new(-1, -1, 2, 2)).unwrap();
        compositor.blit(texture, Rect::new(0, 0, 2, 2), Rect::new(3, 1, 2, 2)).unwrap();
        compositor.blit(texture, Rect::new(0, 0, 2, 2), Rect::new(-500, 900, 2, 2)).unwrap();

        assert_eq!(compositor.frame_pixel(0, 0), Some([50, 60, 70, 255]));
        assert_eq!(compositor.frame_pixel(3, 1), Some([50, 60, 70, 255]));
        assert_eq!(compositor.frame_pixel(1, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_composite_stretches_smaller_surface() {
        let mut compositor = SoftwareCompositor::new(2, 2);
        let surface = compositor.create_surface(1, 1).unwrap();
        compositor.upload_pixels(surface, &[7, 8, 9, 10], 4).unwrap();

        compositor.composite(surface).unwrap();

        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(compositor.frame_pixel(x, y), Some([7, 8, 9, 10]));
        }
    }

    #[test]
    fn test_present_counts_frames() {
        let mut compositor = SoftwareCompositor::new(1, 1);
        compositor.present().unwrap();
        compositor.present().unwrap();
        assert_eq!(compositor.presented_frames(), 2);
    }
}
