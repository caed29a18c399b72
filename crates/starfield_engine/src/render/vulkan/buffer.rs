//! Host-visible staging buffer
//!
//! Each frame the composited RGBA target is written here and copied into the
//! acquired swapchain image.

use ash::{vk, Device, Instance};

use crate::render::vulkan::context::{VulkanError, VulkanResult};
use crate::render::vulkan::swapchain::ChannelOrder;

/// Buffer wrapper with memory management
pub struct Buffer {
    device: Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: vk::DeviceSize,
}

impl Buffer {
    /// Create a new buffer with memory allocation
    pub fn new(
        device: Device,
        instance: &Instance,
        physical_device: vk::PhysicalDevice,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> VulkanResult<Self> {
        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.create_buffer(&buffer_info, None).map_err(VulkanError::Api)? };

        let mem_requirements = unsafe { device.get_buffer_memory_requirements(buffer) };
        let mem_properties = unsafe { instance.get_physical_device_memory_properties(physical_device) };

        let memory_type_index = match find_memory_type(&mem_properties, mem_requirements.memory_type_bits, properties) {
            Ok(index) => index,
            Err(e) => {
                unsafe { device.destroy_buffer(buffer, None) };
                return Err(e);
            }
        };

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(mem_requirements.size)
            .memory_type_index(memory_type_index);

        let memory = match unsafe { device.allocate_memory(&alloc_info, None) } {
            Ok(memory) => memory,
            Err(e) => {
                unsafe { device.destroy_buffer(buffer, None) };
                return Err(VulkanError::Api(e));
            }
        };

        let buffer = Self {
            device,
            buffer,
            memory,
            size,
        };
        unsafe {
            buffer
                .device
                .bind_buffer_memory(buffer.buffer, buffer.memory, 0)
                .map_err(VulkanError::Api)?;
        }

        Ok(buffer)
    }

    /// Host-visible, coherent buffer usable as a transfer source
    pub fn staging(
        device: Device,
        instance: &Instance,
        physical_device: vk::PhysicalDevice,
        size: vk::DeviceSize,
    ) -> VulkanResult<Self> {
        Self::new(
            device,
            instance,
            physical_device,
            size,
            vk::BufferUsageFlags::TRANSFER_SRC,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )
    }

    /// Copy RGBA `pixels` into the buffer in the given channel order
    pub fn write_pixels(&self, pixels: &[u8], order: ChannelOrder) -> VulkanResult<()> {
        let len = pixels.len();
        if len as vk::DeviceSize > self.size {
            return Err(VulkanError::InvalidOperation {
                reason: format!("Staging buffer holds {} bytes, frame has {}", self.size, len),
            });
        }

        unsafe {
            let ptr = self
                .device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .map_err(VulkanError::Api)?;
            let mapped = std::slice::from_raw_parts_mut(ptr.cast::<u8>(), len);
            copy_pixels(pixels, mapped, order);
            self.device.unmap_memory(self.memory);
        }
        Ok(())
    }

    /// Get buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Get size
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_buffer(self.buffer, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Copy RGBA pixels into `dst`, swizzling when the target is BGRA
fn copy_pixels(src: &[u8], dst: &mut [u8], order: ChannelOrder) {
    match order {
        ChannelOrder::Rgba => dst.copy_from_slice(src),
        ChannelOrder::Bgra => {
            for (out, px) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                out[0] = px[2];
                out[1] = px[1];
                out[2] = px[0];
                out[3] = px[3];
            }
        }
    }
}

/// Find memory type with required properties
fn find_memory_type(
    mem_properties: &vk::PhysicalDeviceMemoryProperties,
    type_filter: u32,
    properties: vk::MemoryPropertyFlags,
) -> VulkanResult<u32> {
    (0..mem_properties.memory_type_count)
        .find(|&i| {
            (type_filter & (1 << i)) != 0
                && mem_properties.memory_types[i as usize]
                    .property_flags
                    .contains(properties)
        })
        .ok_or(VulkanError::NoSuitableMemoryType)
}
