//! RGBA color images with staging-buffer upload and download

use ash::{vk, Device};
use std::marker::PhantomData;
use std::path::Path;

use crate::buffer::StagingBuffer;
use crate::context::DeviceContext;
use crate::error::{RenderError, RenderResult};
use crate::image::layout::transition_image_layout;
use crate::image::loader::DecodeRoute;
use crate::image::texel::TexelScalar;

/// Number of color channels per pixel
pub const CHANNELS: u32 = 4;

/// 2D RGBA image with device-local memory, view, and optional sampler
///
/// The format is chosen once at construction from the scalar type: `f32`
/// gives `R32G32B32A32_SFLOAT`, `u8` gives `R8G8B8A8_UNORM` or
/// `R8G8B8A8_SRGB`. The wrapper tracks the image's current layout; callers
/// must transition only through it so the bookkeeping stays accurate.
pub struct RgbaImage2d<T: TexelScalar> {
    device: Device,
    format: vk::Format,
    image: vk::Image,
    memory: vk::DeviceMemory,
    image_view: vk::ImageView,
    sampler: Option<vk::Sampler>,
    layout: vk::ImageLayout,
    width: u32,
    height: u32,
    _marker: PhantomData<T>,
}

impl<T: TexelScalar> RgbaImage2d<T> {
    /// Create an empty image with optimal tiling
    pub fn new(
        ctx: &DeviceContext,
        width: u32,
        height: u32,
        usage: vk::ImageUsageFlags,
        downloadable: bool,
    ) -> RenderResult<Self> {
        Self::with_pixels(
            ctx,
            None,
            width,
            height,
            vk::ImageTiling::OPTIMAL,
            usage,
            false,
            downloadable,
        )
    }

    /// Create an image, optionally uploading initial pixel data
    ///
    /// With initial data the image ends up in SHADER_READ_ONLY_OPTIMAL (usage
    /// must include TRANSFER_DST). Without data, a STORAGE usage flag moves
    /// the image straight to GENERAL; otherwise it stays UNDEFINED.
    pub fn with_pixels(
        ctx: &DeviceContext,
        pixels: Option<&[T]>,
        width: u32,
        height: u32,
        tiling: vk::ImageTiling,
        usage: vk::ImageUsageFlags,
        srgb: bool,
        downloadable: bool,
    ) -> RenderResult<Self> {
        let format = T::color_format(srgb);

        let mut usage = usage;
        if downloadable {
            usage |= vk::ImageUsageFlags::TRANSFER_SRC;
        }

        let device = ctx.device().clone();

        log::debug!("Creating RGBA image {width}x{height}, format {format:?}, usage {usage:?}");

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
                aspect_mask: vk::ImageAspectFlags::COLOR,
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

        let mut result = Self {
            device,
            format,
            image,
            memory,
            image_view,
            sampler: None,
            layout: vk::ImageLayout::UNDEFINED,
            width,
            height,
            _marker: PhantomData,
        };

        if let Some(data) = pixels {
            result.copy_from(ctx, data, width, height, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)?;
        } else if usage.contains(vk::ImageUsageFlags::STORAGE) {
            result.transition_layout(ctx, vk::ImageLayout::GENERAL)?;
        }

        Ok(result)
    }

    /// Load an image file into a sampled texture
    ///
    /// A `.hdr` suffix routes to the floating-point decoder, everything else
    /// to the 8-bit decoder; the file's route must match the image's scalar
    /// type. 8-bit data is stored as sRGB, float data as linear. A sampler
    /// with linear filtering, repeat addressing, and 16x anisotropy is
    /// attached.
    pub fn from_file(
        ctx: &DeviceContext,
        path: impl AsRef<Path>,
        downloadable: bool,
    ) -> RenderResult<Self> {
        let path = path.as_ref();

        let route = DecodeRoute::for_path(path);
        if route != T::DECODE_ROUTE {
            return Err(RenderError::UnsupportedFormat {
                reason: format!(
                    "{} images cannot be loaded from {:?} (decode route {:?})",
                    std::any::type_name::<T>(),
                    path,
                    route
                ),
            });
        }

        let pixels = T::decode_file(path)?;

        let mut result = Self::with_pixels(
            ctx,
            Some(&pixels.data),
            pixels.width,
            pixels.height,
            vk::ImageTiling::OPTIMAL,
            vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST,
            T::LOADS_AS_SRGB,
            downloadable,
        )?;
        result.init_sampler(ctx)?;

        Ok(result)
    }

    /// Upload pixel data into the image
    ///
    /// The declared dimensions must match the image's fixed dimensions. Data
    /// is staged through a host-visible transfer buffer, copied on a one-shot
    /// command buffer, and the image ends in `final_layout`.
    pub fn copy_from(
        &mut self,
        ctx: &DeviceContext,
        data: &[T],
        width: u32,
        height: u32,
        final_layout: vk::ImageLayout,
    ) -> RenderResult<()> {
        validate_upload(self.width, self.height, width, height, data.len())?;

        self.transition_layout(ctx, vk::ImageLayout::TRANSFER_DST_OPTIMAL)?;

        let staging = StagingBuffer::from_bytes(ctx, bytemuck::cast_slice(data))?;
        self.record_buffer_to_image_copy(ctx, &staging)?;

        self.transition_layout(ctx, final_layout)
    }

    /// Download the image's pixels back to the host
    ///
    /// Transitions to TRANSFER_SRC_OPTIMAL, copies into a host-visible
    /// staging buffer, restores the prior layout, and returns the raw scalars
    /// in channel-interleaved order (`width * height * 4` entries).
    pub fn download(&mut self, ctx: &DeviceContext) -> RenderResult<Vec<T>> {
        let size_bytes =
            self.width as usize * self.height as usize * CHANNELS as usize * std::mem::size_of::<T>();
        let prev_layout = self.layout;

        self.transition_layout(ctx, vk::ImageLayout::TRANSFER_SRC_OPTIMAL)?;

        let staging = StagingBuffer::for_download(ctx, size_bytes as vk::DeviceSize)?;
        self.record_image_to_buffer_copy(ctx, &staging)?;

        let bytes = staging.read_bytes()?;

        self.transition_layout(ctx, prev_layout)?;

        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }

    /// Transition the image to a new layout, updating the tracked state
    pub fn transition_layout(
        &mut self,
        ctx: &DeviceContext,
        new_layout: vk::ImageLayout,
    ) -> RenderResult<()> {
        transition_image_layout(ctx, self.image, self.layout, new_layout)?;
        self.layout = new_layout;
        Ok(())
    }

    fn record_buffer_to_image_copy(
        &self,
        ctx: &DeviceContext,
        staging: &StagingBuffer,
    ) -> RenderResult<()> {
        let region = self.full_image_copy_region();
        let image = self.image;
        let buffer = staging.handle();

        ctx.execute_one_time(|command_buffer| unsafe {
            ctx.device().cmd_copy_buffer_to_image(
                command_buffer,
                buffer,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );
        })
    }

    fn record_image_to_buffer_copy(
        &self,
        ctx: &DeviceContext,
        staging: &StagingBuffer,
    ) -> RenderResult<()> {
        let region = self.full_image_copy_region();
        let image = self.image;
        let buffer = staging.handle();

        ctx.execute_one_time(|command_buffer| unsafe {
            ctx.device().cmd_copy_image_to_buffer(
                command_buffer,
                image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                buffer,
                &[region],
            );
        })
    }

    fn full_image_copy_region(&self) -> vk::BufferImageCopy {
        vk::BufferImageCopy::builder()
            .buffer_offset(0)
            .buffer_row_length(0)
            .buffer_image_height(0)
            .image_subresource(vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: 0,
                base_array_layer: 0,
                layer_count: 1,
            })
            .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
            .image_extent(vk::Extent3D {
                width: self.width,
                height: self.height,
                depth: 1,
            })
            .build()
    }

    fn init_sampler(&mut self, ctx: &DeviceContext) -> RenderResult<()> {
        let sampler_create_info = vk::SamplerCreateInfo::builder()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .anisotropy_enable(true)
            .max_anisotropy(16.0)
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .unnormalized_coordinates(false)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(0.0);

        let sampler = unsafe {
            ctx.device()
                .create_sampler(&sampler_create_info, None)
                .map_err(RenderError::Api)?
        };

        self.sampler = Some(sampler);
        Ok(())
    }

    /// Get the device format
    pub fn format(&self) -> vk::Format {
        self.format
    }

    /// Get the image handle
    pub fn image(&self) -> vk::Image {
        self.image
    }

    /// Get the image view for descriptor binding
    pub fn image_view(&self) -> vk::ImageView {
        self.image_view
    }

    /// Get the sampler, if one was created
    pub fn sampler(&self) -> Option<vk::Sampler> {
        self.sampler
    }

    /// The image's current layout
    pub fn layout(&self) -> vk::ImageLayout {
        self.layout
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

impl<T: TexelScalar> Drop for RgbaImage2d<T> {
    fn drop(&mut self) {
        unsafe {
            if let Some(sampler) = self.sampler.take() {
                self.device.destroy_sampler(sampler, None);
            }
            self.device.destroy_image_view(self.image_view, None);
            self.device.destroy_image(self.image, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Check that offered pixel data matches the image's fixed dimensions
fn validate_upload(
    expected_width: u32,
    expected_height: u32,
    width: u32,
    height: u32,
    scalar_count: usize,
) -> RenderResult<()> {
    if width != expected_width || height != expected_height {
        return Err(RenderError::DimensionMismatch {
            expected_width,
            expected_height,
            width,
            height,
        });
    }

    let expected_len = width as usize * height as usize * CHANNELS as usize;
    if scalar_count != expected_len {
        return Err(RenderError::InvalidOperation {
            reason: format!(
                "pixel data has {scalar_count} scalars, expected {expected_len} for {width}x{height} RGBA"
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_with_matching_dimensions_is_accepted() {
        assert!(validate_upload(8, 4, 8, 4, 8 * 4 * 4).is_ok());
    }

    #[test]
    fn upload_with_mismatched_dimensions_is_rejected() {
        let err = validate_upload(8, 4, 4, 8, 4 * 8 * 4).unwrap_err();
        match err {
            RenderError::DimensionMismatch {
                expected_width,
                expected_height,
                width,
                height,
            } => {
                assert_eq!((expected_width, expected_height), (8, 4));
                assert_eq!((width, height), (4, 8));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(validate_upload(8, 4, 8, 5, 8 * 5 * 4).is_err());
        assert!(validate_upload(8, 4, 7, 4, 7 * 4 * 4).is_err());
    }

    #[test]
    fn upload_with_short_pixel_data_is_rejected() {
        let err = validate_upload(8, 4, 8, 4, 8 * 4 * 3).unwrap_err();
        assert!(matches!(err, RenderError::InvalidOperation { .. }));
    }
}
