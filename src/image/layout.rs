//! Image layout transitions
//!
//! Encodes the synchronization scope required on each side of a layout
//! transition: the access mask and pipeline stage implied by a layout. Wrong
//! masks under-synchronize silently, so the mapping here is the one piece of
//! policy in the image wrappers.

use ash::vk;

use crate::context::DeviceContext;
use crate::error::RenderResult;

/// Access mask implied by an image layout
///
/// Layouts without an associated access (UNDEFINED, GENERAL, present, ...)
/// map to an empty mask.
pub fn access_mask(layout: vk::ImageLayout) -> vk::AccessFlags {
    match layout {
        vk::ImageLayout::PREINITIALIZED => vk::AccessFlags::HOST_WRITE,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL => vk::AccessFlags::TRANSFER_WRITE,
        vk::ImageLayout::TRANSFER_SRC_OPTIMAL => vk::AccessFlags::TRANSFER_READ,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL => {
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE
        }
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL => vk::AccessFlags::SHADER_READ,
        _ => vk::AccessFlags::empty(),
    }
}

/// Pipeline stage implied by an image layout
///
/// UNDEFINED anchors at the top of the pipe (nothing to wait for); layouts
/// with no specific stage anchor at the bottom.
pub fn stage_flags(layout: vk::ImageLayout) -> vk::PipelineStageFlags {
    match layout {
        vk::ImageLayout::TRANSFER_DST_OPTIMAL | vk::ImageLayout::TRANSFER_SRC_OPTIMAL => {
            vk::PipelineStageFlags::TRANSFER
        }
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL => {
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
        }
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL => {
            vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
        }
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL => vk::PipelineStageFlags::FRAGMENT_SHADER,
        vk::ImageLayout::PREINITIALIZED => vk::PipelineStageFlags::HOST,
        vk::ImageLayout::UNDEFINED => vk::PipelineStageFlags::TOP_OF_PIPE,
        _ => vk::PipelineStageFlags::BOTTOM_OF_PIPE,
    }
}

/// Transition a color image between layouts on a one-shot command buffer
///
/// Issues a single image memory barrier with masks and stages derived from
/// the old and new layouts, submitted synchronously. The caller is
/// responsible for recording the new layout.
pub(crate) fn transition_image_layout(
    ctx: &DeviceContext,
    image: vk::Image,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) -> RenderResult<()> {
    let src_access_mask = access_mask(old_layout);
    let dst_access_mask = access_mask(new_layout);
    let src_stage = stage_flags(old_layout);
    let dst_stage = stage_flags(new_layout);

    log::debug!("Image layout transition {old_layout:?} -> {new_layout:?}");

    let barrier = vk::ImageMemoryBarrier::builder()
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        })
        .src_access_mask(src_access_mask)
        .dst_access_mask(dst_access_mask)
        .build();

    ctx.execute_one_time(|command_buffer| unsafe {
        ctx.device().cmd_pipeline_barrier(
            command_buffer,
            src_stage,
            dst_stage,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[barrier],
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_masks_follow_the_layout_table() {
        let cases = [
            (vk::ImageLayout::PREINITIALIZED, vk::AccessFlags::HOST_WRITE),
            (
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::AccessFlags::TRANSFER_WRITE,
            ),
            (
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                vk::AccessFlags::TRANSFER_READ,
            ),
            (
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            ),
            (
                vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            ),
            (
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                vk::AccessFlags::SHADER_READ,
            ),
            (vk::ImageLayout::UNDEFINED, vk::AccessFlags::empty()),
            (vk::ImageLayout::GENERAL, vk::AccessFlags::empty()),
            (vk::ImageLayout::PRESENT_SRC_KHR, vk::AccessFlags::empty()),
        ];

        for (layout, expected) in cases {
            assert_eq!(access_mask(layout), expected, "layout {layout:?}");
        }
    }

    #[test]
    fn stage_flags_follow_the_layout_table() {
        let cases = [
            (
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::PipelineStageFlags::TRANSFER,
            ),
            (
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                vk::PipelineStageFlags::TRANSFER,
            ),
            (
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            ),
            (
                vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            ),
            (
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
            ),
            (vk::ImageLayout::PREINITIALIZED, vk::PipelineStageFlags::HOST),
            (
                vk::ImageLayout::UNDEFINED,
                vk::PipelineStageFlags::TOP_OF_PIPE,
            ),
            (
                vk::ImageLayout::GENERAL,
                vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            ),
            (
                vk::ImageLayout::PRESENT_SRC_KHR,
                vk::PipelineStageFlags::BOTTOM_OF_PIPE,
            ),
        ];

        for (layout, expected) in cases {
            assert_eq!(stage_flags(layout), expected, "layout {layout:?}");
        }
    }
}
