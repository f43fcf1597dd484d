//! GPU buffer management
//!
//! RAII-based buffer wrappers with automatic memory allocation, binding, and
//! cleanup, plus the host-visible staging buffers used to move pixel data
//! between host and device.

use ash::{vk, Device};

use crate::context::DeviceContext;
use crate::error::{RenderError, RenderResult};

/// GPU buffer wrapper with automatic memory management
///
/// Each buffer instance owns its device memory and cleans up when dropped.
/// Memory type selection is handled by the context based on the requested
/// property flags.
pub struct Buffer {
    device: Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: vk::DeviceSize,
}

impl Buffer {
    /// Create a new buffer with memory allocation
    pub fn new(
        ctx: &DeviceContext,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> RenderResult<Self> {
        let device = ctx.device().clone();

        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe {
            device
                .create_buffer(&buffer_info, None)
                .map_err(RenderError::Api)?
        };

        let mem_requirements = unsafe { device.get_buffer_memory_requirements(buffer) };

        let memory_type_index =
            ctx.find_memory_type(mem_requirements.memory_type_bits, properties)?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(mem_requirements.size)
            .memory_type_index(memory_type_index);

        let memory = unsafe {
            device
                .allocate_memory(&alloc_info, None)
                .map_err(RenderError::Api)?
        };

        unsafe {
            device
                .bind_buffer_memory(buffer, memory, 0)
                .map_err(RenderError::Api)?;
        }

        Ok(Self {
            device,
            buffer,
            memory,
            size,
        })
    }

    /// Map memory for access
    pub fn map_memory(&self) -> RenderResult<*mut std::ffi::c_void> {
        unsafe {
            self.device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .map_err(RenderError::Api)
        }
    }

    /// Unmap memory
    pub fn unmap_memory(&self) {
        unsafe {
            self.device.unmap_memory(self.memory);
        }
    }

    /// Write raw bytes into the buffer (host-visible memory only)
    pub fn write_bytes(&self, data: &[u8]) -> RenderResult<()> {
        if data.len() as vk::DeviceSize > self.size {
            return Err(RenderError::InvalidOperation {
                reason: format!(
                    "write of {} bytes exceeds buffer size {}",
                    data.len(),
                    self.size
                ),
            });
        }

        let data_ptr = self.map_memory()?;
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), data_ptr.cast::<u8>(), data.len());
        }
        self.unmap_memory();
        Ok(())
    }

    /// Read the buffer's contents back as raw bytes (host-visible memory only)
    pub fn read_bytes(&self) -> RenderResult<Vec<u8>> {
        let data_ptr = self.map_memory()?;
        let mut result = vec![0u8; self.size as usize];
        unsafe {
            std::ptr::copy_nonoverlapping(data_ptr.cast::<u8>(), result.as_mut_ptr(), result.len());
        }
        self.unmap_memory();
        Ok(result)
    }

    /// Get buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Get size in bytes
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

/// Host-visible staging buffer for transfers between host and device
///
/// The upload form wraps TRANSFER_SRC memory prefilled from raw bytes; the
/// download form wraps empty TRANSFER_DST memory that a device copy fills and
/// the host then reads back.
pub struct StagingBuffer {
    buffer: Buffer,
}

impl StagingBuffer {
    /// Create a staging buffer prefilled with data, usable as a copy source
    pub fn from_bytes(ctx: &DeviceContext, data: &[u8]) -> RenderResult<Self> {
        let buffer = Buffer::new(
            ctx,
            data.len() as vk::DeviceSize,
            vk::BufferUsageFlags::TRANSFER_SRC,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )?;

        buffer.write_bytes(data)?;

        Ok(Self { buffer })
    }

    /// Create an empty staging buffer usable as a copy destination
    pub fn for_download(ctx: &DeviceContext, size: vk::DeviceSize) -> RenderResult<Self> {
        let buffer = Buffer::new(
            ctx,
            size,
            vk::BufferUsageFlags::TRANSFER_DST,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )?;

        Ok(Self { buffer })
    }

    /// Read the staged contents back to the host
    pub fn read_bytes(&self) -> RenderResult<Vec<u8>> {
        self.buffer.read_bytes()
    }

    /// Get buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer.handle()
    }

    /// Get size in bytes
    pub fn size(&self) -> vk::DeviceSize {
        self.buffer.size()
    }
}
