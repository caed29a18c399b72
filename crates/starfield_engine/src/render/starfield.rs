//! Parallax starfield layers
//!
//! Each layer is a group of stars sharing one velocity and one brightness.
//! Slow dim layers read as far away, fast bright ones as close; drawing them
//! far-to-near puts the near stars on top.
//!
//! Stars only drift horizontally. Their velocity is applied as a full vector
//! add but only the x component is committed, so a star keeps its row for
//! life. Nothing wraps a star back onto the canvas: once it leaves on the
//! right the pixel buffer's bounds check simply stops drawing it.

use rand::Rng;

use crate::foundation::math::{Color, Vec3};
use crate::render::pixel_buffer::PixelBuffer;

/// A single star
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Current position in canvas pixels
    pub position: Vec3,
    /// Per-frame displacement, constant for the particle's lifetime
    pub velocity: Vec3,
    /// Draw color
    pub color: Color,
}

impl Particle {
    /// Advance one frame along x
    pub fn update(&mut self) {
        let next = self.position + self.velocity;
        self.position.x = next.x;
    }

    /// Canvas pixel this particle lands on, truncating toward zero
    pub fn pixel_coords(&self) -> (i32, i32) {
        (self.position.x as i32, self.position.y as i32)
    }
}

/// Velocity and brightness shared by one depth layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    /// Human-readable layer name
    pub name: &'static str,
    /// Horizontal speed in pixels per frame
    pub speed: f32,
    /// Grey level of every star in the layer
    pub brightness: u8,
}

impl LayerSpec {
    /// Velocity vector for stars in this layer
    pub fn velocity(&self) -> Vec3 {
        Vec3::new(self.speed, 0.0, 0.0)
    }

    /// Color of stars in this layer
    pub fn color(&self) -> Color {
        Color::grey(self.brightness)
    }
}

/// The three starfield layers, back to front
pub const STAR_LAYERS: [LayerSpec; 3] = [
    LayerSpec { name: "far", speed: 0.5, brightness: 70 },
    LayerSpec { name: "mid", speed: 0.7, brightness: 170 },
    LayerSpec { name: "near", speed: 1.0, brightness: 255 },
];

/// An ordered group of stars
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleLayer {
    name: &'static str,
    particles: Vec<Particle>,
}

impl ParticleLayer {
    /// Create a layer from existing particles
    pub fn new(name: &'static str, particles: Vec<Particle>) -> Self {
        Self { name, particles }
    }

    /// Scatter `count` stars uniformly over a `width` x `height` canvas
    pub fn scatter<R: Rng + ?Sized>(
        spec: &LayerSpec,
        count: usize,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Self {
        let velocity = spec.velocity();
        let color = spec.color();
        let particles = (0..count)
            .map(|_| Particle {
                position: Vec3::new(
                    rng.gen::<f32>() * width as f32,
                    rng.gen::<f32>() * height as f32,
                    0.0,
                ),
                velocity,
                color,
            })
            .collect();

        Self::new(spec.name, particles)
    }

    /// Layer name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stars in draw order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of stars
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the layer has no stars
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Advance every star one frame
    pub fn update(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
    }

    /// Rasterize every star into `buffer`; last write wins
    pub fn draw(&self, buffer: &mut PixelBuffer) {
        for particle in &self.particles {
            let (x, y) = particle.pixel_coords();
            buffer.set_pixel(x, y, particle.color);
        }
    }
}
