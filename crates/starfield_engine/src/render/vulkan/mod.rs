//! Vulkan presentation backend
//!
//! A GLFW window plus just enough Vulkan to put a CPU-composited frame on
//! screen: a swapchain written by transfer commands, one staging buffer and
//! one frame in flight.

pub mod buffer;
pub mod commands;
pub mod context;
pub mod presenter;
pub mod swapchain;
pub mod sync;
pub mod window;

pub use context::{LogicalDevice, PhysicalDeviceInfo, VulkanContext, VulkanError, VulkanInstance, VulkanResult};
pub use presenter::VulkanPresenter;
pub use swapchain::Swapchain;
pub use window::{Window, WindowError, WindowResult};
