//! Vulkan synchronization primitives
//!
//! One frame is in flight at a time: the CPU waits on the in-flight fence
//! before reusing the staging buffer and command buffer.

use ash::{vk, Device};

use crate::render::vulkan::context::{VulkanError, VulkanResult};

/// GPU-GPU synchronization primitive with automatic resource management
pub struct Semaphore {
    device: Device,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    /// Create a new semaphore
    pub fn new(device: Device) -> VulkanResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::builder();

        let semaphore = unsafe { device.create_semaphore(&create_info, None).map_err(VulkanError::Api)? };

        Ok(Self { device, semaphore })
    }

    /// Get the semaphore handle
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.semaphore, None);
        }
    }
}

/// Fence wrapper with RAII cleanup
pub struct Fence {
    device: Device,
    fence: vk::Fence,
}

impl Fence {
    /// Create a new fence
    pub fn new(device: Device, signaled: bool) -> VulkanResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };

        let create_info = vk::FenceCreateInfo::builder().flags(flags);

        let fence = unsafe { device.create_fence(&create_info, None).map_err(VulkanError::Api)? };

        Ok(Self { device, fence })
    }

    /// Wait for fence
    pub fn wait(&self, timeout: u64) -> VulkanResult<()> {
        unsafe {
            self.device
                .wait_for_fences(&[self.fence], true, timeout)
                .map_err(VulkanError::Api)
        }
    }

    /// Reset fence
    pub fn reset(&self) -> VulkanResult<()> {
        unsafe { self.device.reset_fences(&[self.fence]).map_err(VulkanError::Api) }
    }

    /// Get the fence handle
    pub fn handle(&self) -> vk::Fence {
        self.fence
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_fence(self.fence, None);
        }
    }
}

/// Synchronization objects for the single in-flight frame
///
/// `copy_finished` holds one semaphore per swapchain image, since a
/// presentation may still be waiting on the previous image's semaphore when
/// the next frame is submitted.
pub struct FrameSync {
    /// Signalled when the acquired image may be written
    pub image_available: Semaphore,
    /// Signalled per image when the frame copy has finished
    pub copy_finished: Vec<Semaphore>,
    /// Signalled when the GPU is done with the staging buffer
    pub in_flight: Fence,
}

impl FrameSync {
    /// Create frame synchronization objects for `image_count` swapchain images
    pub fn new(device: &Device, image_count: usize) -> VulkanResult<Self> {
        let image_available = Semaphore::new(device.clone())?;
        let copy_finished = Self::per_image(device, image_count)?;
        let in_flight = Fence::new(device.clone(), true)?;

        Ok(Self {
            image_available,
            copy_finished,
            in_flight,
        })
    }

    /// Replace the per-image semaphores after a swapchain recreation
    pub fn resize(&mut self, device: &Device, image_count: usize) -> VulkanResult<()> {
        self.copy_finished = Self::per_image(device, image_count)?;
        Ok(())
    }

    fn per_image(device: &Device, image_count: usize) -> VulkanResult<Vec<Semaphore>> {
        (0..image_count).map(|_| Semaphore::new(device.clone())).collect()
    }
}
