//! Depth attachment images

use ash::{vk, Device};
use std::marker::PhantomData;

use crate::context::DeviceContext;
use crate::error::{RenderError, RenderResult};
use crate::image::texel::TexelScalar;

/// 2D depth image with device-local memory and a DEPTH-aspect view
///
/// The format is chosen once at construction from the scalar type; only
/// 32-bit float depth is supported. No transfer helpers are exposed: depth
/// images are consumed as attachments, not uploaded or downloaded.
pub struct DepthImage2d<T: TexelScalar> {
    device: Device,
    format: vk::Format,
    image: vk::Image,
    memory: vk::DeviceMemory,
    image_view: vk::ImageView,
    width: u32,
    height: u32,
    _marker: PhantomData<T>,
}

impl<T: TexelScalar> DepthImage2d<T> {
    /// Create a depth image with optimal tiling
    pub fn new(
        ctx: &DeviceContext,
        width: u32,
        height: u32,
        downloadable: bool,
    ) -> RenderResult<Self> {
        Self::with_tiling(ctx, width, height, vk::ImageTiling::OPTIMAL, downloadable)
    }

    /// Create a depth image with explicit tiling
    pub fn with_tiling(
        ctx: &DeviceContext,
        width: u32,
        height: u32,
        tiling: vk::ImageTiling,
        downloadable: bool,
    ) -> RenderResult<Self> {
        let format = T::DEPTH_FORMAT.ok_or_else(|| RenderError::UnsupportedFormat {
            reason: format!(
                "scalar type {} has no depth format; only f32 depth is supported",
                std::any::type_name::<T>()
            ),
        })?;

        let mut usage = vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
        if downloadable {
            usage |= vk::ImageUsageFlags::TRANSFER_SRC;
        }

        let device = ctx.device().clone();

        log::debug!("Creating depth image {width}x{height}, format {format:?}");

        let image_create_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(format)
            .tiling(tiling)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .samples(vk::SampleCountFlags::TYPE_1);

        let image = unsafe {
            device
                .create_image(&image_create_info, None)
                .map_err(RenderError::Api)?
        };

        let memory_requirements = unsafe { device.get_image_memory_requirements(image) };
        let memory_type_index = ctx.find_memory_type(
            memory_requirements.memory_type_bits,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        let memory_allocate_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(memory_requirements.size)
            .memory_type_index(memory_type_index);

        let memory = unsafe {
            device
                .allocate_memory(&memory_allocate_info, None)
                .map_err(RenderError::Api)?
        };

        unsafe {
            device
                .bind_image_memory(image, memory, 0)
                .map_err(RenderError::Api)?;
        }

        let image_view_create_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::DEPTH,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        let image_view = unsafe {
            device
                .create_image_view(&image_view_create_info, None)
                .map_err(RenderError::Api)?
        };

        Ok(Self {
            device,
            format,
            image,
            memory,
            image_view,
            width,
            height,
            _marker: PhantomData,
        })
    }

    /// Get the device format
    pub fn format(&self) -> vk::Format {
        self.format
    }

    /// Get the image handle
    pub fn image(&self) -> vk::Image {
        self.image
    }

    /// Get the image view for attachment binding
    pub fn image_view(&self) -> vk::ImageView {
        self.image_view
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl<T: TexelScalar> Drop for DepthImage2d<T> {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_image_view(self.image_view, None);
            self.device.destroy_image(self.image, None);
            self.device.free_memory(self.memory, None);
        }
    }
}
