//! Command pool management
//!
//! Holds the transient command pool backing one-shot transfer and barrier
//! submissions. Recording and submission live on
//! [`DeviceContext::execute_one_time`](crate::context::DeviceContext::execute_one_time).

use ash::{vk, Device};

use crate::error::{RenderError, RenderResult};

/// Command pool wrapper with RAII cleanup
pub struct CommandPool {
    device: Device,
    command_pool: vk::CommandPool,
}

impl CommandPool {
    /// Create a new command pool on the given queue family
    pub fn new(device: Device, queue_family_index: u32) -> RenderResult<Self> {
        let pool_create_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(queue_family_index);

        let command_pool = unsafe {
            device
                .create_command_pool(&pool_create_info, None)
                .map_err(RenderError::Api)?
        };

        Ok(Self {
            device,
            command_pool,
        })
    }

    /// Allocate primary command buffers
    pub fn allocate_command_buffers(&self, count: u32) -> RenderResult<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        let command_buffers = unsafe {
            self.device
                .allocate_command_buffers(&alloc_info)
                .map_err(RenderError::Api)?
        };

        Ok(command_buffers)
    }

    /// Get the command pool handle
    pub fn handle(&self) -> vk::CommandPool {
        self.command_pool
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        unsafe {
            // All submissions through this pool are synchronous, but wait for
            // idle anyway before tearing the pool down
            let _ = self.device.device_wait_idle();
            self.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
