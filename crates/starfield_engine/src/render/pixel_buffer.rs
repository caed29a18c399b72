//! CPU-side RGBA canvas
//!
//! The pixel buffer is the shared drawing target for every particle layer.
//! Addressing is `(y * width + x) * 4`, and the bounds check in
//! [`PixelBuffer::set_pixel`] is the only guard against off-canvas
//! coordinates: particles drift past the right edge all the time, so those
//! writes are dropped without comment.

use crate::foundation::math::Color;

/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Flat RGBA8 pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a zeroed buffer of `width * height` pixels
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
            width,
            height,
        }
    }

    /// Canvas width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Total length in bytes
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the buffer holds no pixels at all
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Zero every byte, alpha included
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Flat byte offset of `(x, y)` if a write there would be accepted
    ///
    /// Accepted offsets lie in `[0, len - 4)`. Negative coordinates and
    /// columns at or past the right edge are rejected instead of spilling
    /// into a neighbouring row.
    pub fn offset_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width {
            return None;
        }
        let index = (i64::from(y) * i64::from(self.width) + i64::from(x)) * BYTES_PER_PIXEL as i64;
        let limit = self.pixels.len() as i64 - BYTES_PER_PIXEL as i64;
        if index < limit {
            Some(index as usize)
        } else {
            None
        }
    }

    /// Write `color` at `(x, y)`
    ///
    /// Only the r, g and b bytes are written; alpha keeps whatever it held.
    /// Out-of-range coordinates are a silent no-op.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(offset) = self.offset_of(x, y) {
            self.pixels[offset] = color.r;
            self.pixels[offset + 1] = color.g;
            self.pixels[offset + 2] = color.b;
        }
    }

    /// RGBA bytes at `(x, y)`, if inside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.pixels[offset..offset + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(200, 10, 20);

    #[test]
    fn test_new_buffer_is_zeroed_and_sized() {
        let buffer = PixelBuffer::new(1280, 720);
        assert_eq!(buffer.len(), 1280 * 720 * 4);
        assert_eq!(buffer.stride(), 1280 * 4);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_pixel_writes_rgb_and_leaves_alpha() {
        let mut buffer = PixelBuffer::new(8, 4);
        buffer.set_pixel(3, 2, RED);

        let offset = (2 * 8 + 3) * 4;
        assert_eq!(&buffer.as_bytes()[offset..offset + 4], &[200, 10, 20, 0]);
        assert_eq!(buffer.pixel(3, 2), Some([200, 10, 20, 0]));
    }

    #[test]
    fn test_in_bounds_sweep_touches_exactly_three_bytes() {
        let (width, height) = (6, 5);
        let mut buffer = PixelBuffer::new(width, height);
        let last = (width * height - 1) as usize;

        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let before = buffer.as_bytes().to_vec();
                buffer.set_pixel(x, y, Color::WHITE);
                let changed: Vec<usize> = before
                    .iter()
                    .zip(buffer.as_bytes())
                    .enumerate()
                    .filter(|(_, (a, b))| a != b)
                    .map(|(i, _)| i)
                    .collect();

                let pixel_index = (y as u32 * width + x as u32) as usize;
                if pixel_index == last {
                    // The final pixel sits at len - 4, outside [0, len - 4)
                    assert!(changed.is_empty());
                } else {
                    let offset = pixel_index * 4;
                    assert_eq!(changed, vec![offset, offset + 1, offset + 2]);
                }
            }
        }
    }

    #[test]
    fn test_out_of_bounds_writes_are_dropped() {
        let mut buffer = PixelBuffer::new(16, 16);
        let untouched = buffer.clone();

        buffer.set_pixel(-1, 0, RED);
        buffer.set_pixel(0, -1, RED);
        buffer.set_pixel(16, 3, RED);
        buffer.set_pixel(1_000, 0, RED);
        buffer.set_pixel(0, 16, RED);
        buffer.set_pixel(i32::MAX, i32::MAX, RED);
        buffer.set_pixel(i32::MIN, i32::MIN, RED);

        assert_eq!(buffer, untouched);
    }

    #[test]
    fn test_clear_zeroes_everything() {
        let mut buffer = PixelBuffer::new(10, 10);
        for i in 0..10 {
            buffer.set_pixel(i, i, Color::WHITE);
        }

        buffer.clear();

        assert_eq!(buffer.len(), 400);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_sized_buffer_never_panics() {
        let mut buffer = PixelBuffer::new(0, 0);
        buffer.set_pixel(0, 0, RED);
        assert!(buffer.is_empty());
        assert_eq!(buffer.offset_of(0, 0), None);
    }
}
