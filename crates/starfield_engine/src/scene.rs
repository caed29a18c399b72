//! Scene contents
//!
//! The scene owns every particle layer, every banner and the font the banners
//! are drawn with. The frame driver holds the only scene and passes it around
//! by reference; nothing here is global.

use rand::Rng;

use crate::config::DisplayConfig;
use crate::render::pixel_buffer::PixelBuffer;
use crate::render::presenter::{Presenter, RenderResult};
use crate::render::starfield::{ParticleLayer, STAR_LAYERS};
use crate::render::text::{BitmapFont, TextBanner};

/// Particle layers, banners and font for one display
#[derive(Debug, Clone)]
pub struct Scene {
    layers: Vec<ParticleLayer>,
    banners: Vec<TextBanner>,
    font: BitmapFont,
}

impl Scene {
    /// Assemble a scene; `layers` must be ordered back to front
    pub fn new(layers: Vec<ParticleLayer>, banners: Vec<TextBanner>, font: BitmapFont) -> Self {
        Self { layers, banners, font }
    }

    /// The starfield with the configured banners
    ///
    /// Each banner starts just off the edge it scrolls in from.
    pub fn demo<R: Rng + ?Sized>(config: &DisplayConfig, font: BitmapFont, rng: &mut R) -> Self {
        let layers: Vec<_> = STAR_LAYERS
            .iter()
            .map(|spec| ParticleLayer::scatter(spec, config.stars_per_layer, config.width, config.height, rng))
            .collect();

        let (glyph_width, glyph_height) = font.cell_size();
        let banners: Vec<_> = config
            .banners
            .iter()
            .map(|banner| {
                TextBanner::entering(banner.text, banner.y, banner.speed, glyph_width, glyph_height, config.width)
            })
            .collect();

        log::info!(
            "Scene built: {} layers x {} stars, {} banners",
            layers.len(),
            config.stars_per_layer,
            banners.len()
        );

        Self::new(layers, banners, font)
    }

    /// Advance every layer, then every banner, one frame
    pub fn update(&mut self) {
        for layer in &mut self.layers {
            layer.update();
        }
        for banner in &mut self.banners {
            banner.update();
        }
    }

    /// Rasterize the layers back to front
    pub fn draw_particles(&self, buffer: &mut PixelBuffer) {
        for layer in &self.layers {
            layer.draw(buffer);
        }
    }

    /// Blit every banner on top of whatever the presenter has composited
    pub fn draw_banners<P: Presenter + ?Sized>(&self, presenter: &mut P) -> RenderResult<()> {
        for banner in &self.banners {
            banner.draw(presenter, &self.font)?;
        }
        Ok(())
    }

    /// Particle layers, back to front
    pub fn layers(&self) -> &[ParticleLayer] {
        &self.layers
    }

    /// Banners in draw order
    pub fn banners(&self) -> &[TextBanner] {
        &self.banners
    }

    /// Font shared by all banners
    pub fn font(&self) -> &BitmapFont {
        &self.font
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::presenter::testing::RecordingPresenter;
    use crate::render::presenter::TextureHandle;
    use crate::render::text::GlyphAtlas;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn test_font() -> BitmapFont {
        BitmapFont::new(GlyphAtlas::build(32, 6, 10, 32, 32).unwrap(), TextureHandle::new(0))
    }

    fn demo_scene(seed: u64) -> Scene {
        let mut rng = StdRng::seed_from_u64(seed);
        Scene::demo(&DisplayConfig::default(), test_font(), &mut rng)
    }

    #[test]
    fn test_demo_layers_are_back_to_front() {
        let scene = demo_scene(1);

        let names: Vec<_> = scene.layers().iter().map(ParticleLayer::name).collect();
        assert_eq!(names, ["far", "mid", "near"]);
        assert!(scene.layers().iter().all(|layer| layer.len() == 400));
    }

    #[test]
    fn test_demo_banners_start_off_screen() {
        let scene = demo_scene(2);

        assert_eq!(scene.banners().len(), 2);
        assert_eq!(scene.banners()[0].text(), "HELLO WORLD");
        assert_eq!(scene.banners()[0].position.x, 1312.0);
        assert_eq!(scene.banners()[1].position.x, -(27.0 * 32.0));
    }

    #[test]
    fn test_draw_banners_uses_the_shared_font() {
        let scene = demo_scene(3);
        let mut presenter = RecordingPresenter::default();

        scene.draw_banners(&mut presenter).unwrap();

        let expected = scene.banners().iter().map(|b| b.text().chars().count()).sum::<usize>();
        assert_eq!(presenter.blits().len(), expected);
    }

    #[test]
    fn test_thousand_frames_of_starfield() {
        let mut scene = demo_scene(4);
        let mut buffer = PixelBuffer::new(1280, 720);
        let initial_len = buffer.len();
        let starts: Vec<Vec<f32>> = scene
            .layers()
            .iter()
            .map(|layer| layer.particles().iter().map(|p| p.position.x).collect())
            .collect();

        let frames = 1000;
        for frame in 0..frames {
            scene.update();
            scene.draw_particles(&mut buffer);
            assert_eq!(buffer.len(), initial_len);
            if frame + 1 < frames {
                buffer.clear();
            }
        }

        let mut on_canvas = HashSet::new();
        for (layer, xs) in scene.layers().iter().zip(&starts) {
            for (particle, &x0) in layer.particles().iter().zip(xs) {
                assert_relative_eq!(particle.position.x, x0 + frames as f32 * particle.velocity.x, epsilon = 0.1);
                let (x, y) = particle.pixel_coords();
                if buffer.offset_of(x, y).is_some() {
                    on_canvas.insert((x, y));
                }
            }
        }

        // Every lit pixel belongs to a star still on the canvas
        for y in 0..720 {
            for x in 0..1280 {
                let lit = buffer.pixel(x, y).is_some_and(|px| px[..3] != [0, 0, 0]);
                if lit {
                    assert!(on_canvas.contains(&(x as i32, y as i32)), "stray pixel at ({x}, {y})");
                }
            }
        }

        // The near layer has moved 1000px right, so most of it is gone
        let near = &scene.layers()[2];
        let visible = near
            .particles()
            .iter()
            .filter(|p| p.pixel_coords().0 < 1280)
            .count();
        assert!(visible < near.len() / 2);
    }
}
