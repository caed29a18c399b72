//! Window management using GLFW
//!
//! Provides the fixed-size output window, the Vulkan surface hooks, and the
//! non-blocking event pump the frame driver drains every frame.

use std::collections::VecDeque;

use thiserror::Error;

use crate::input::{EventSource, FrameEvent};

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// GLFW refused to create the window
    #[error("Window creation failed")]
    CreationFailed,

    /// Any other GLFW failure
    #[error("GLFW error: {0}")]
    GlfwError(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// Translate a GLFW event into what the frame driver understands
pub fn map_window_event(event: &glfw::WindowEvent) -> FrameEvent {
    match event {
        glfw::WindowEvent::Close => FrameEvent::Quit,
        _ => FrameEvent::Other,
    }
}

/// GLFW window wrapper with proper resource management
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    pending: VecDeque<glfw::WindowEvent>,
    pumped: bool,
}

impl Window {
    /// Open a non-resizable `width` x `height` window at `position`
    pub fn new(title: &str, width: u32, height: u32, position: (i32, i32)) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors).map_err(|_| WindowError::InitializationFailed)?;

        // Configure for Vulkan (no OpenGL context)
        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(false));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_pos(position.0, position.1);
        window.set_close_polling(true);

        log::info!("Created {}x{} window \"{}\" at {:?}", width, height, title, position);

        Ok(Self {
            glfw,
            window,
            events,
            pending: VecDeque::new(),
            pumped: false,
        })
    }

    /// Whether the close button has been pressed
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Current framebuffer size in pixels
    pub fn get_framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Get required Vulkan instance extensions from GLFW
    pub fn get_required_instance_extensions(&self) -> WindowResult<Vec<String>> {
        self.glfw
            .get_required_instance_extensions()
            .ok_or_else(|| WindowError::GlfwError("Failed to get required extensions".to_string()))
    }

    /// Create Vulkan surface using GLFW's built-in functionality
    pub fn create_vulkan_surface(&mut self, instance: ash::vk::Instance) -> WindowResult<ash::vk::SurfaceKHR> {
        let mut surface = ash::vk::SurfaceKHR::null();
        let result = self.window.create_window_surface(instance, std::ptr::null(), &mut surface);

        if result == ash::vk::Result::SUCCESS {
            Ok(surface)
        } else {
            Err(WindowError::GlfwError(format!("Failed to create Vulkan surface: {:?}", result)))
        }
    }
}

impl EventSource for Window {
    fn poll_event(&mut self) -> Option<FrameEvent> {
        // Pump GLFW once per drain; a `None` ends the drain
        if !self.pumped {
            self.glfw.poll_events();
            self.pending
                .extend(glfw::flush_messages(&self.events).map(|(_, event)| event));
            self.pumped = true;
        }

        match self.pending.pop_front() {
            Some(event) => Some(map_window_event(&event)),
            None => {
                self.pumped = false;
                None
            }
        }
    }
}
