//! Display configuration
//!
//! Everything here is a compile-time constant. [`DisplayConfig::default`]
//! gathers the constants into one value that is handed to the driver and the
//! scene builder.

use std::time::Duration;

/// Canvas width in pixels
pub const CANVAS_WIDTH: u32 = 1280;

/// Canvas height in pixels
pub const CANVAS_HEIGHT: u32 = 720;

/// Per-frame time budget
pub const FRAME_BUDGET: Duration = Duration::from_millis(7);

/// Number of stars in every parallax layer
pub const STARS_PER_LAYER: usize = 400;

/// Window title
pub const WINDOW_TITLE: &str = "Starfield";

/// Initial window position on screen
pub const WINDOW_POSITION: (i32, i32) = (300, 300);

/// Font image, relative to the working directory
pub const FONT_PATH: &str = "resources/fonts/font2.png";

/// Grid geometry of the bitmap font image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontGrid {
    /// Character code of the top-left cell
    pub first_char: u32,
    /// Number of cell rows
    pub rows: u32,
    /// Number of cell columns
    pub cols: u32,
    /// Cell width in pixels
    pub cell_width: u32,
    /// Cell height in pixels
    pub cell_height: u32,
}

/// The 10x6 grid of 32px cells starting at the space character
pub const FONT_GRID: FontGrid = FontGrid {
    first_char: 32,
    rows: 6,
    cols: 10,
    cell_width: 32,
    cell_height: 32,
};

/// A scrolling banner to place in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct BannerConfig {
    /// Text to scroll
    pub text: &'static str,
    /// Vertical position of the banner's top edge
    pub y: f32,
    /// Horizontal speed in pixels per frame; the sign picks the direction
    pub speed: f32,
}

/// Complete display configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Window title
    pub title: &'static str,
    /// Canvas width
    pub width: u32,
    /// Canvas height
    pub height: u32,
    /// Initial window position
    pub window_position: (i32, i32),
    /// Frame budget
    pub frame_budget: Duration,
    /// Stars per parallax layer
    pub stars_per_layer: usize,
    /// Font image path
    pub font_path: &'static str,
    /// Font grid geometry
    pub font_grid: FontGrid,
    /// Banners, top to bottom
    pub banners: Vec<BannerConfig>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: WINDOW_TITLE,
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            window_position: WINDOW_POSITION,
            frame_budget: FRAME_BUDGET,
            stars_per_layer: STARS_PER_LAYER,
            font_path: FONT_PATH,
            font_grid: FONT_GRID,
            banners: vec![
                BannerConfig {
                    text: "HELLO WORLD",
                    y: 0.0,
                    speed: -2.0,
                },
                BannerConfig {
                    text: "GREETINGS TO ALL STARGAZERS",
                    y: (CANVAS_HEIGHT - FONT_GRID.cell_height) as f32,
                    speed: 1.5,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_constants() {
        let config = DisplayConfig::default();

        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.frame_budget, Duration::from_millis(7));
        assert_eq!(config.stars_per_layer, 400);
        assert_eq!(config.font_grid.rows * config.font_grid.cols, 60);
    }

    #[test]
    fn test_default_banners_scroll_both_ways() {
        let config = DisplayConfig::default();

        assert!(config.banners.iter().any(|banner| banner.speed < 0.0));
        assert!(config.banners.iter().any(|banner| banner.speed > 0.0));
        for banner in &config.banners {
            assert!(banner.y + config.font_grid.cell_height as f32 <= config.height as f32);
        }
    }
}
