//! Vulkan swapchain presenter
//!
//! Composition happens on the CPU in a [`SoftwareCompositor`]. Presenting
//! copies the finished frame through a staging buffer into the acquired
//! swapchain image and queues it for display.

use ash::vk;

use crate::assets::ImageData;
use crate::render::compositor::SoftwareCompositor;
use crate::render::presenter::{Presenter, Rect, RenderError, RenderResult, SurfaceHandle, TextureHandle};
use crate::render::vulkan::buffer::Buffer;
use crate::render::vulkan::commands::{CommandPool, CommandRecorder};
use crate::render::vulkan::context::{VulkanContext, VulkanError, VulkanResult};
use crate::render::vulkan::swapchain::Swapchain;
use crate::render::vulkan::sync::FrameSync;
use crate::render::vulkan::window::{Window, WindowError};

impl From<VulkanError> for RenderError {
    fn from(error: VulkanError) -> Self {
        Self::Backend(error.to_string())
    }
}

impl From<WindowError> for RenderError {
    fn from(error: WindowError) -> Self {
        Self::Backend(error.to_string())
    }
}

/// [`Presenter`] that displays a CPU-composited frame through Vulkan
///
/// Must be dropped before the [`Window`] it was created for.
pub struct VulkanPresenter {
    compositor: SoftwareCompositor,
    command_buffer: vk::CommandBuffer,
    staging: Buffer,
    sync: FrameSync,
    command_pool: CommandPool,
    swapchain: Swapchain,
    context: VulkanContext,
}

impl VulkanPresenter {
    /// Set up Vulkan for `window` with a `width` x `height` output target
    pub fn new(window: &mut Window, app_name: &str, width: u32, height: u32) -> VulkanResult<Self> {
        let context = VulkanContext::new(window, app_name)?;
        let device = context.raw_device();

        let (fb_width, fb_height) = window.get_framebuffer_size();
        let fallback_extent = vk::Extent2D {
            width: fb_width,
            height: fb_height,
        };
        let swapchain = Swapchain::new(&context, &device, fallback_extent, vk::SwapchainKHR::null())?;

        let command_pool = CommandPool::new(device.clone(), context.physical_device.graphics_family)?;
        let command_buffer = command_pool.allocate()?;
        let sync = FrameSync::new(&device, swapchain.images().len())?;

        let compositor = SoftwareCompositor::new(width, height);
        let staging = Buffer::staging(
            device,
            context.instance(),
            context.physical_device.device,
            compositor.frame().len() as vk::DeviceSize,
        )?;

        Ok(Self {
            compositor,
            command_buffer,
            staging,
            sync,
            command_pool,
            swapchain,
            context,
        })
    }

    /// The CPU-side compositor frames are built in
    pub fn compositor(&self) -> &SoftwareCompositor {
        &self.compositor
    }

    fn recreate_swapchain(&mut self) -> VulkanResult<()> {
        self.context.wait_idle()?;

        let device = self.context.raw_device();
        let swapchain = Swapchain::new(&self.context, &device, self.swapchain.extent(), self.swapchain.handle())?;
        self.swapchain = swapchain;
        self.sync.resize(&device, self.swapchain.images().len())?;

        log::info!("Swapchain recreated");
        Ok(())
    }

    fn record_copy(&self, image: vk::Image) -> VulkanResult<vk::CommandBuffer> {
        let device = &self.context.device.device;
        let (width, height) = self.compositor.size();
        let target = self.swapchain.extent();
        let copy_extent = vk::Extent2D {
            width: width.min(target.width),
            height: height.min(target.height),
        };

        let mut recorder = CommandRecorder::begin(device, self.command_buffer)?;
        recorder.image_barrier(
            image,
            (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL),
            (vk::AccessFlags::empty(), vk::AccessFlags::TRANSFER_WRITE),
            (vk::PipelineStageFlags::TRANSFER, vk::PipelineStageFlags::TRANSFER),
        );
        recorder.clear_to_black(image);
        recorder.image_barrier(
            image,
            (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::TRANSFER_DST_OPTIMAL),
            (vk::AccessFlags::TRANSFER_WRITE, vk::AccessFlags::TRANSFER_WRITE),
            (vk::PipelineStageFlags::TRANSFER, vk::PipelineStageFlags::TRANSFER),
        );
        recorder.copy_buffer_to_image(self.staging.handle(), image, width, copy_extent);
        recorder.image_barrier(
            image,
            (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::PRESENT_SRC_KHR),
            (vk::AccessFlags::TRANSFER_WRITE, vk::AccessFlags::empty()),
            (vk::PipelineStageFlags::TRANSFER, vk::PipelineStageFlags::BOTTOM_OF_PIPE),
        );
        recorder.end()
    }

    fn present_frame(&mut self) -> VulkanResult<()> {
        self.sync.in_flight.wait(u64::MAX)?;

        let acquired = unsafe {
            self.swapchain.loader().acquire_next_image(
                self.swapchain.handle(),
                u64::MAX,
                self.sync.image_available.handle(),
                vk::Fence::null(),
            )
        };
        let image_index = match acquired {
            Ok((index, _suboptimal)) => index,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                // Frame is dropped; the next one goes to the new swapchain
                return self.recreate_swapchain();
            }
            Err(e) => return Err(VulkanError::Api(e)),
        };

        let image = *self
            .swapchain
            .images()
            .get(image_index as usize)
            .ok_or_else(|| VulkanError::InvalidOperation {
                reason: format!("Acquired image {} out of range", image_index),
            })?;
        let copy_finished = self
            .sync
            .copy_finished
            .get(image_index as usize)
            .map(|semaphore| semaphore.handle())
            .ok_or_else(|| VulkanError::InvalidOperation {
                reason: format!("No semaphore for image {}", image_index),
            })?;

        self.staging
            .write_pixels(self.compositor.frame(), self.swapchain.channel_order())?;
        let command_buffer = self.record_copy(image)?;

        self.sync.in_flight.reset()?;

        let wait_semaphores = [self.sync.image_available.handle()];
        let wait_stages = [vk::PipelineStageFlags::TRANSFER];
        let command_buffers = [command_buffer];
        let signal_semaphores = [copy_finished];
        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build();

        let device = &self.context.device;
        unsafe {
            device
                .device
                .queue_submit(device.graphics_queue, &[submit_info], self.sync.in_flight.handle())
                .map_err(VulkanError::Api)?;
        }

        let swapchains = [self.swapchain.handle()];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let presented = unsafe { self.swapchain.loader().queue_present(device.present_queue, &present_info) };
        match presented {
            Ok(false) => Ok(()),
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => self.recreate_swapchain(),
            Err(e) => Err(VulkanError::Api(e)),
        }
    }
}

impl Presenter for VulkanPresenter {
    fn create_surface(&mut self, width: u32, height: u32) -> RenderResult<SurfaceHandle> {
        self.compositor.create_surface(width, height)
    }

    fn create_texture(&mut self, image: &ImageData) -> RenderResult<TextureHandle> {
        self.compositor.create_texture(image)
    }

    fn upload_pixels(&mut self, surface: SurfaceHandle, pixels: &[u8], stride: usize) -> RenderResult<()> {
        self.compositor.upload_pixels(surface, pixels, stride)
    }

    fn composite(&mut self, surface: SurfaceHandle) -> RenderResult<()> {
        self.compositor.composite(surface)
    }

    fn blit(&mut self, texture: TextureHandle, src: Rect, dst: Rect) -> RenderResult<()> {
        self.compositor.blit(texture, src, dst)
    }

    fn present(&mut self) -> RenderResult<()> {
        self.compositor.present()?;
        self.present_frame()?;
        Ok(())
    }
}

impl Drop for VulkanPresenter {
    fn drop(&mut self) {
        if let Err(e) = self.context.wait_idle() {
            log::warn!("Device wait before teardown failed: {}", e);
        }
    }
}
