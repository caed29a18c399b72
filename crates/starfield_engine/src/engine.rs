//! Frame driver
//!
//! Owns the scene, the pixel buffer and the collaborators, and runs the
//! per-frame sequence until a quit event arrives:
//!
//! 1. note the frame start
//! 2. drain input; a quit stops here
//! 3. update layers and banners
//! 4. draw layers back to front into the pixel buffer
//! 5. upload the buffer to the surface
//! 6. composite the surface onto the output target
//! 7. blit the banners on top
//! 8. present
//! 9. clear the pixel buffer
//! 10. sleep away what is left of the frame budget

use thiserror::Error;

use crate::config::DisplayConfig;
use crate::foundation::time::{FrameClock, FramePacer, PaceReport, SystemClock, Timer};
use crate::input::EventSource;
use crate::render::pixel_buffer::PixelBuffer;
use crate::render::presenter::{Presenter, RenderError, SurfaceHandle};
use crate::render::text::FontError;
use crate::render::vulkan::{VulkanError, WindowError};
use crate::scene::Scene;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Presenter failure, during setup or inside the frame loop
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// The bitmap font could not be loaded
    #[error("Font error: {0}")]
    Font(#[from] FontError),

    /// The window could not be opened
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Vulkan setup failed
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] VulkanError),

    /// Any other startup failure
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
}

/// Driver lifecycle; `Stopping` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Frames are being produced
    Running,
    /// A quit was seen or a frame failed; no more frames
    Stopping,
}

/// What one call to [`FrameDriver::run_frame`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was presented and paced
    Presented(PaceReport),
    /// The driver is stopping; nothing was drawn
    Quit,
}

/// Single-threaded frame loop over a scene
///
/// The presenter is declared before the event source so it is dropped first;
/// a window-backed presenter must not outlive its window.
pub struct FrameDriver<P, E, C = SystemClock> {
    presenter: P,
    events: E,
    clock: C,
    scene: Scene,
    buffer: PixelBuffer,
    surface: SurfaceHandle,
    pacer: FramePacer,
    timer: Timer,
    state: DriverState,
}

impl<P: Presenter, E: EventSource> FrameDriver<P, E, SystemClock> {
    /// Create a driver paced by the wall clock
    pub fn new(config: &DisplayConfig, presenter: P, events: E, scene: Scene) -> Result<Self, EngineError> {
        Self::with_clock(config, presenter, events, scene, SystemClock)
    }
}

impl<P: Presenter, E: EventSource, C: FrameClock> FrameDriver<P, E, C> {
    /// Create a driver with an explicit clock
    ///
    /// Creates the streaming surface the pixel buffer is uploaded to.
    pub fn with_clock(
        config: &DisplayConfig,
        mut presenter: P,
        events: E,
        scene: Scene,
        clock: C,
    ) -> Result<Self, EngineError> {
        let surface = presenter.create_surface(config.width, config.height)?;
        let timer = Timer::new(clock.now());

        log::info!(
            "Frame driver ready: {}x{} canvas, {:?} frame budget",
            config.width,
            config.height,
            config.frame_budget
        );

        Ok(Self {
            presenter,
            events,
            clock,
            scene,
            buffer: PixelBuffer::new(config.width, config.height),
            surface,
            pacer: FramePacer::new(config.frame_budget),
            timer,
            state: DriverState::Running,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The scene being animated
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The presenter frames go to
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The CPU canvas; all zero between frames
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Frame statistics
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Run one iteration of the frame sequence
    ///
    /// Any presenter error stops the driver and is returned.
    pub fn run_frame(&mut self) -> Result<FrameOutcome, EngineError> {
        if self.state == DriverState::Stopping {
            return Ok(FrameOutcome::Quit);
        }

        let frame_start = self.clock.now();

        if self.events.drain_quit() {
            log::info!("Quit requested");
            self.state = DriverState::Stopping;
            return Ok(FrameOutcome::Quit);
        }

        if let Err(e) = self.render_frame() {
            self.state = DriverState::Stopping;
            return Err(e.into());
        }

        let report = self.pacer.finish_frame(&mut self.clock, frame_start);
        self.timer.tick(frame_start + report.total);
        if report.over_budget(self.pacer.budget()) {
            log::trace!("Frame {} over budget: {:?}", self.timer.frame_count(), report.work);
        }

        Ok(FrameOutcome::Presented(report))
    }

    fn render_frame(&mut self) -> Result<(), RenderError> {
        self.scene.update();
        self.scene.draw_particles(&mut self.buffer);

        self.presenter
            .upload_pixels(self.surface, self.buffer.as_bytes(), self.buffer.stride())?;
        self.presenter.composite(self.surface)?;
        self.scene.draw_banners(&mut self.presenter)?;
        self.presenter.present()?;

        self.buffer.clear();
        Ok(())
    }

    /// Produce frames until quit, returning how many were presented
    pub fn run(&mut self) -> Result<u64, EngineError> {
        log::info!("Starting frame loop");

        while self.state == DriverState::Running {
            self.run_frame()?;
        }

        log::info!(
            "Frame loop stopped after {} frames ({:.1} fps average)",
            self.timer.frame_count(),
            self.timer.average_fps()
        );
        Ok(self.timer.frame_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageData;
    use crate::foundation::math::{Color, Vec3};
    use crate::foundation::time::testing::ManualClock;
    use crate::input::testing::ScriptedEvents;
    use crate::input::FrameEvent;
    use crate::render::compositor::SoftwareCompositor;
    use crate::render::presenter::testing::{PresenterCall, RecordingPresenter};
    use crate::render::presenter::TextureHandle;
    use crate::render::starfield::{Particle, ParticleLayer};
    use crate::render::text::{BitmapFont, GlyphAtlas, TextBanner};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn small_scene() -> Scene {
        let star = Particle {
            position: Vec3::new(10.0, 10.0, 0.0),
            velocity: Vec3::new(1.0, 0.0, 0.0),
            color: Color::WHITE,
        };
        let banner = TextBanner::new("HI", Vec3::new(100.0, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0), 32, 32, 1280);
        let font = BitmapFont::new(GlyphAtlas::build(32, 6, 10, 32, 32).unwrap(), TextureHandle::new(0));
        Scene::new(vec![ParticleLayer::new("near", vec![star])], vec![banner], font)
    }

    fn driver(
        events: ScriptedEvents,
        work_per_read: Duration,
    ) -> FrameDriver<RecordingPresenter, ScriptedEvents, ManualClock> {
        FrameDriver::with_clock(
            &DisplayConfig::default(),
            RecordingPresenter::default(),
            events,
            small_scene(),
            ManualClock::new(work_per_read),
        )
        .unwrap()
    }

    #[test]
    fn test_new_creates_canvas_sized_surface() {
        let driver = driver(ScriptedEvents::default(), Duration::ZERO);

        assert_eq!(driver.presenter().calls, vec![PresenterCall::CreateSurface(1280, 720)]);
        assert_eq!(driver.buffer().len(), 1280 * 720 * 4);
        assert_eq!(driver.state(), DriverState::Running);
    }

    #[test]
    fn test_quit_skips_the_rest_of_the_frame() {
        let mut driver = driver(ScriptedEvents::quit_on_frame(0), Duration::ZERO);
        let before = driver.scene().banners()[0].position.x;

        assert_eq!(driver.run_frame().unwrap(), FrameOutcome::Quit);

        assert_eq!(driver.state(), DriverState::Stopping);
        assert_eq!(driver.presenter().calls.len(), 1);
        assert_eq!(driver.scene().banners()[0].position.x, before);

        // Stopping is terminal
        assert_eq!(driver.run_frame().unwrap(), FrameOutcome::Quit);
        assert_eq!(driver.presenter().calls.len(), 1);
    }

    #[test]
    fn test_frame_steps_run_in_order() {
        let mut driver = driver(ScriptedEvents::new(vec![vec![FrameEvent::Other]]), Duration::ZERO);

        driver.run_frame().unwrap();

        let surface = SurfaceHandle::new(0);
        let calls = &driver.presenter().calls[1..];
        assert_eq!(calls.len(), 5);
        assert_eq!(
            calls[0],
            PresenterCall::Upload {
                surface,
                lit_pixels: 1,
                stride: 1280 * 4,
            }
        );
        assert_eq!(calls[1], PresenterCall::Composite(surface));
        assert!(matches!(calls[2], PresenterCall::Blit { dst, .. } if dst.x == 98));
        assert!(matches!(calls[3], PresenterCall::Blit { dst, .. } if dst.x == 130));
        assert_eq!(calls[4], PresenterCall::Present);
    }

    #[test]
    fn test_buffer_is_cleared_after_present() {
        let mut driver = driver(ScriptedEvents::default(), Duration::ZERO);

        driver.run_frame().unwrap();
        driver.run_frame().unwrap();

        assert!(driver.buffer().as_bytes().iter().all(|&b| b == 0));
        // Each upload saw only this frame's single star
        let uploads: Vec<_> = driver
            .presenter()
            .calls
            .iter()
            .filter_map(|call| match call {
                PresenterCall::Upload { lit_pixels, .. } => Some(*lit_pixels),
                _ => None,
            })
            .collect();
        assert_eq!(uploads, vec![1, 1]);
    }

    #[test]
    fn test_present_failure_stops_the_driver() {
        let mut presenter = RecordingPresenter::default();
        presenter.fail_present_after = Some(1);
        let mut driver = FrameDriver::with_clock(
            &DisplayConfig::default(),
            presenter,
            ScriptedEvents::default(),
            small_scene(),
            ManualClock::new(Duration::ZERO),
        )
        .unwrap();

        assert!(driver.run_frame().is_ok());
        let err = driver.run_frame().unwrap_err();

        assert!(matches!(err, EngineError::Render(RenderError::Backend(_))));
        assert_eq!(driver.state(), DriverState::Stopping);
        // The failed frame's canvas was never cleared
        assert!(driver.buffer().as_bytes().iter().any(|&b| b != 0));
        assert!(driver.run().is_ok());
    }

    #[test]
    fn test_fast_frames_are_padded_to_budget() {
        let mut driver = driver(ScriptedEvents::default(), Duration::ZERO);

        let FrameOutcome::Presented(report) = driver.run_frame().unwrap() else {
            panic!("frame was not presented");
        };

        assert_eq!(report.slept, Duration::from_millis(7));
        assert!(report.total >= Duration::from_millis(7));
    }

    #[test]
    fn test_slow_frames_do_not_sleep() {
        let mut driver = driver(ScriptedEvents::default(), Duration::from_millis(10));

        let FrameOutcome::Presented(report) = driver.run_frame().unwrap() else {
            panic!("frame was not presented");
        };

        assert_eq!(report.slept, Duration::ZERO);
        assert!(report.over_budget(Duration::from_millis(7)));
    }

    #[test]
    fn test_run_counts_presented_frames() {
        let mut driver = driver(ScriptedEvents::quit_on_frame(3), Duration::ZERO);

        assert_eq!(driver.run().unwrap(), 3);
        assert_eq!(driver.presenter().presents(), 3);
        assert_eq!(driver.state(), DriverState::Stopping);
        assert!((driver.timer().total_time() - 0.021).abs() < 1e-4);
    }

    #[test]
    fn test_demo_scene_on_software_compositor() {
        let config = DisplayConfig::default();
        let mut compositor = SoftwareCompositor::new(config.width, config.height);
        let font_image = ImageData::solid_color(320, 192, [255, 255, 255, 255]).unwrap();
        let font = BitmapFont::from_image(&mut compositor, &font_image, &config.font_grid).unwrap();
        let scene = Scene::demo(&config, font, &mut StdRng::seed_from_u64(9));

        let mut driver = FrameDriver::with_clock(
            &config,
            compositor,
            ScriptedEvents::quit_on_frame(50),
            scene,
            ManualClock::new(Duration::ZERO),
        )
        .unwrap();

        assert_eq!(driver.run().unwrap(), 50);

        let compositor = driver.presenter();
        assert_eq!(compositor.presented_frames(), 50);
        // "HELLO WORLD" entered from x = 1312 at 2px per frame
        assert_eq!(driver.scene().banners()[0].position.x, 1212.0);
        assert_eq!(compositor.frame_pixel(1220, 10), Some([255, 255, 255, 255]));
        assert_eq!(compositor.frame().len(), 1280 * 720 * 4);
    }
}
