//! Scrolling text banners
//!
//! A banner is one line of fixed-width glyphs sliding horizontally. When the
//! whole line has left the canvas it reappears just past the opposite edge,
//! so it loops forever in whichever direction its velocity points.

use crate::foundation::math::Vec3;
use crate::render::presenter::{Presenter, Rect, RenderResult};
use crate::render::text::BitmapFont;

/// A horizontally scrolling, wrapping line of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextBanner {
    text: String,
    /// Top-left corner of the first glyph, canvas pixels
    pub position: Vec3,
    /// Per-frame displacement; only x is ever applied
    pub velocity: Vec3,
    glyph_width: u32,
    glyph_height: u32,
    canvas_width: u32,
}

impl TextBanner {
    /// Create a banner at `position` moving by `velocity` each frame
    pub fn new(
        text: impl Into<String>,
        position: Vec3,
        velocity: Vec3,
        glyph_width: u32,
        glyph_height: u32,
        canvas_width: u32,
    ) -> Self {
        Self {
            text: text.into(),
            position,
            velocity,
            glyph_width,
            glyph_height,
            canvas_width,
        }
    }

    /// Create a banner at row `y` that starts fully off-screen on the side it
    /// scrolls in from
    pub fn entering(
        text: impl Into<String>,
        y: f32,
        speed: f32,
        glyph_width: u32,
        glyph_height: u32,
        canvas_width: u32,
    ) -> Self {
        let mut banner = Self::new(
            text,
            Vec3::new(0.0, y, 0.0),
            Vec3::new(speed, 0.0, 0.0),
            glyph_width,
            glyph_height,
            canvas_width,
        );
        banner.position.x = if speed < 0.0 {
            banner.right_reentry_x()
        } else {
            banner.left_reentry_x()
        };
        banner
    }

    /// Banner text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Glyph cell size
    pub fn glyph_size(&self) -> (u32, u32) {
        (self.glyph_width, self.glyph_height)
    }

    /// Width of the whole line in pixels
    pub fn span(&self) -> f32 {
        (self.text.chars().count() as u64 * u64::from(self.glyph_width)) as f32
    }

    /// Where a leftward banner reappears
    fn right_reentry_x(&self) -> f32 {
        self.canvas_width as f32 + self.glyph_width as f32
    }

    /// Where a rightward banner reappears
    fn left_reentry_x(&self) -> f32 {
        -self.span()
    }

    /// Advance one frame, wrapping once the line has fully left the canvas
    pub fn update(&mut self) {
        let candidate = self.position + self.velocity;

        if self.velocity.x < 0.0 {
            self.position.x = if candidate.x < -self.span() {
                self.right_reentry_x()
            } else {
                candidate.x
            };
        } else if self.velocity.x > 0.0 {
            self.position.x = if candidate.x > self.span() + self.canvas_width as f32 {
                self.left_reentry_x()
            } else {
                candidate.x
            };
        }
    }

    /// Destination rectangle of the glyph at character index `index`
    pub fn glyph_rect(&self, index: usize) -> Rect {
        let x = self.position.x.round() as i64 + index as i64 * i64::from(self.glyph_width);
        Rect::new(
            x.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            self.position.y.round() as i32,
            self.glyph_width,
            self.glyph_height,
        )
    }

    /// Blit every character through `presenter`, left to right
    pub fn draw<P: Presenter + ?Sized>(&self, presenter: &mut P, font: &BitmapFont) -> RenderResult<()> {
        for (index, character) in self.text.chars().enumerate() {
            let src = font.atlas.source_rect(font.atlas.lookup(character));
            presenter.blit(font.texture, src, self.glyph_rect(index))?;
        }
        Ok(())
    }
}
