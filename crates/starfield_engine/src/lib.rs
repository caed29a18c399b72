//! # Starfield Engine
//!
//! A frame composition engine for a parallax starfield with scrolling
//! bitmap-font banners.
//!
//! ## Features
//!
//! - **Parallax starfield**: depth layers of stars drawn into a CPU pixel buffer
//! - **Bitmap text**: grid glyph atlases and wrapping text banners
//! - **Fixed-budget pacing**: every frame padded to a constant time budget
//! - **Pluggable presentation**: a software compositor and a Vulkan swapchain
//!   presenter behind one [`Presenter`](render::Presenter) trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use starfield_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DisplayConfig::default();
//!     let mut window = Window::new(config.title, config.width, config.height, config.window_position)?;
//!     let mut presenter = VulkanPresenter::new(&mut window, config.title, config.width, config.height)?;
//!     let font = BitmapFont::load(&mut presenter, config.font_path, &config.font_grid)?;
//!     let scene = Scene::demo(&config, font, &mut rand::thread_rng());
//!
//!     FrameDriver::new(&config, presenter, window, scene)?.run()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{DriverState, EngineError, FrameDriver, FrameOutcome};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, ImageData},
        config::{DisplayConfig, FontGrid},
        foundation::{
            math::{Color, Vec3},
            time::{FrameClock, FramePacer, SystemClock, Timer},
        },
        input::{EventSource, FrameEvent},
        render::{
            vulkan::{VulkanPresenter, Window},
            BitmapFont, PixelBuffer, Presenter, SoftwareCompositor, TextBanner,
        },
        scene::Scene,
        DriverState, EngineError, FrameDriver, FrameOutcome,
    };
}
