//! Starfield demo
//!
//! Opens a window, loads the bitmap font and runs the parallax starfield with
//! its scrolling banners until the window is closed.

use starfield_engine::foundation::logging;
use starfield_engine::prelude::*;

fn run(config: &DisplayConfig) -> Result<u64, EngineError> {
    let mut window = Window::new(config.title, config.width, config.height, config.window_position)?;
    let mut presenter = VulkanPresenter::new(&mut window, config.title, config.width, config.height)?;

    let font = BitmapFont::load(&mut presenter, config.font_path, &config.font_grid)?;
    let scene = Scene::demo(config, font, &mut rand::thread_rng());

    let mut driver = FrameDriver::new(config, presenter, window, scene)?;
    driver.run()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic hook for better error reporting
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC occurred: {:?}", panic_info);

        if let Some(location) = panic_info.location() {
            eprintln!("Panic location: {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    logging::init();

    log::info!("Starting starfield");
    let config = DisplayConfig::default();

    match run(&config) {
        Ok(frames) => {
            log::info!("Starfield closed after {} frames", frames);
            Ok(())
        }
        Err(e) => {
            log::error!("Starfield failed: {}", e);
            Err(e.into())
        }
    }
}
