//! Vulkan swapchain management
//!
//! Swapchain images are written by transfer commands only, so they are
//! created with `TRANSFER_DST` usage and no image views.

use ash::extensions::khr::Swapchain as SwapchainLoader;
use ash::{vk, Device};

use crate::render::vulkan::context::{VulkanContext, VulkanError, VulkanResult};

/// Swapchain management wrapper with RAII cleanup
pub struct Swapchain {
    swapchain_loader: SwapchainLoader,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
}

/// Byte order of a swapchain image relative to the RGBA frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Same as the frame
    Rgba,
    /// Red and blue swapped
    Bgra,
}

impl ChannelOrder {
    /// Channel order for a swapchain format
    pub fn of(format: vk::Format) -> Self {
        match format {
            vk::Format::B8G8R8A8_UNORM | vk::Format::B8G8R8A8_SRGB => Self::Bgra,
            _ => Self::Rgba,
        }
    }
}

/// Formats the RGBA8 frame can be copied into byte for byte, UNORM first
const COPYABLE_FORMATS: [vk::Format; 4] = [
    vk::Format::B8G8R8A8_UNORM,
    vk::Format::R8G8B8A8_UNORM,
    vk::Format::B8G8R8A8_SRGB,
    vk::Format::R8G8B8A8_SRGB,
];

fn choose_format(formats: &[vk::SurfaceFormatKHR]) -> VulkanResult<vk::SurfaceFormatKHR> {
    let copyable = |wanted: vk::Format| formats.iter().filter(move |sf| sf.format == wanted);

    COPYABLE_FORMATS
        .iter()
        .find_map(|&wanted| copyable(wanted).find(|sf| sf.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR))
        .or_else(|| COPYABLE_FORMATS.iter().find_map(|&wanted| copyable(wanted).next()))
        .copied()
        .ok_or_else(|| {
            VulkanError::InitializationFailed(format!(
                "Surface offers no 8-bit RGBA or BGRA format: {:?}",
                formats.iter().map(|sf| sf.format).collect::<Vec<_>>()
            ))
        })
}

impl Swapchain {
    /// Create a swapchain for the context's surface
    ///
    /// `fallback_extent` is used only when the surface leaves the extent up
    /// to the application. Pass the previous handle as `old_swapchain` when
    /// recreating.
    pub fn new(
        context: &VulkanContext,
        device: &Device,
        fallback_extent: vk::Extent2D,
        old_swapchain: vk::SwapchainKHR,
    ) -> VulkanResult<Self> {
        let physical_device = context.physical_device.device;
        let surface = context.surface;
        let surface_loader = &context.surface_loader;
        let swapchain_loader = SwapchainLoader::new(context.instance(), device);

        let surface_caps = unsafe {
            surface_loader
                .get_physical_device_surface_capabilities(physical_device, surface)
                .map_err(VulkanError::Api)?
        };

        if !surface_caps
            .supported_usage_flags
            .contains(vk::ImageUsageFlags::TRANSFER_DST)
        {
            return Err(VulkanError::InitializationFailed(
                "Surface does not support transfer writes".to_string(),
            ));
        }

        let surface_formats = unsafe {
            surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map_err(VulkanError::Api)?
        };
        let format = choose_format(&surface_formats)?;

        let present_modes = unsafe {
            surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
                .map_err(VulkanError::Api)?
        };

        let present_mode = present_modes
            .iter()
            .copied()
            .find(|&mode| mode == vk::PresentModeKHR::MAILBOX)
            .unwrap_or(vk::PresentModeKHR::FIFO);

        let extent = if surface_caps.current_extent.width != u32::MAX {
            surface_caps.current_extent
        } else {
            vk::Extent2D {
                width: fallback_extent.width.clamp(
                    surface_caps.min_image_extent.width,
                    surface_caps.max_image_extent.width,
                ),
                height: fallback_extent.height.clamp(
                    surface_caps.min_image_extent.height,
                    surface_caps.max_image_extent.height,
                ),
            }
        };

        let image_count = if surface_caps.max_image_count > 0 {
            (surface_caps.min_image_count + 1).min(surface_caps.max_image_count)
        } else {
            surface_caps.min_image_count + 1
        };

        let swapchain_create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::TRANSFER_DST)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(surface_caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let swapchain = unsafe {
            swapchain_loader
                .create_swapchain(&swapchain_create_info, None)
                .map_err(VulkanError::Api)?
        };

        let images = unsafe {
            swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(VulkanError::Api)?
        };

        log::info!(
            "Swapchain ready: {} images, {:?}, {}x{}, {:?}",
            images.len(),
            format.format,
            extent.width,
            extent.height,
            present_mode
        );

        Ok(Self {
            swapchain_loader,
            swapchain,
            images,
            format,
            extent,
        })
    }

    /// Get swapchain extent
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Get surface format
    pub fn format(&self) -> vk::SurfaceFormatKHR {
        self.format
    }

    /// Byte order the staging copy must use
    pub fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::of(self.format.format)
    }

    /// Swapchain images
    pub fn images(&self) -> &[vk::Image] {
        &self.images
    }

    /// Get swapchain handle
    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }

    /// Get swapchain loader
    pub fn loader(&self) -> &SwapchainLoader {
        &self.swapchain_loader
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
    }
}
