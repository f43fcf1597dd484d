//! Integration tests that require a Vulkan-capable device
//!
//! Run with `cargo test -- --ignored` on a machine with a Vulkan driver.

use ash::vk;
use render_core::{DepthImage2d, DeviceContext, RgbaImage2d};

fn context() -> DeviceContext {
    let _ = env_logger::builder().is_test(true).try_init();
    DeviceContext::with_validation("render-core-tests", false)
        .expect("Vulkan device required for this test")
}

#[test]
#[ignore = "requires a Vulkan device"]
fn rgba8_upload_download_roundtrip() {
    let ctx = context();

    let mut image = RgbaImage2d::<u8>::new(
        &ctx,
        4,
        4,
        vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST,
        true,
    )
    .unwrap();

    let pixels: Vec<u8> = (0..4 * 4 * 4).map(|i| i as u8).collect();
    image
        .copy_from(&ctx, &pixels, 4, 4, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
        .unwrap();
    assert_eq!(image.layout(), vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);

    let downloaded = image.download(&ctx).unwrap();
    assert_eq!(downloaded, pixels);
    // download restores the prior layout
    assert_eq!(image.layout(), vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
}

#[test]
#[ignore = "requires a Vulkan device"]
fn rgba32f_upload_download_roundtrip() {
    let ctx = context();

    let mut image = RgbaImage2d::<f32>::new(
        &ctx,
        2,
        2,
        vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST,
        true,
    )
    .unwrap();

    let pixels: Vec<f32> = (0..2 * 2 * 4).map(|i| i as f32 * 0.25).collect();
    image
        .copy_from(&ctx, &pixels, 2, 2, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
        .unwrap();

    let downloaded = image.download(&ctx).unwrap();
    for (got, want) in downloaded.iter().zip(&pixels) {
        approx::assert_relative_eq!(*got, *want);
    }
}

#[test]
#[ignore = "requires a Vulkan device"]
fn copy_from_rejects_mismatched_dimensions() {
    let ctx = context();

    let mut image = RgbaImage2d::<u8>::new(
        &ctx,
        4,
        4,
        vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST,
        false,
    )
    .unwrap();

    let pixels = vec![0u8; 8 * 8 * 4];
    let result = image.copy_from(&ctx, &pixels, 8, 8, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
    assert!(result.is_err());
}

#[test]
#[ignore = "requires a Vulkan device"]
fn storage_usage_transitions_to_general() {
    let ctx = context();

    let image = RgbaImage2d::<f32>::new(
        &ctx,
        8,
        8,
        vk::ImageUsageFlags::STORAGE,
        false,
    )
    .unwrap();

    assert_eq!(image.layout(), vk::ImageLayout::GENERAL);
}

#[test]
#[ignore = "requires a Vulkan device"]
fn depth_image_requires_float_scalar() {
    let ctx = context();

    assert!(DepthImage2d::<f32>::new(&ctx, 64, 64, false).is_ok());
    assert!(DepthImage2d::<u8>::new(&ctx, 64, 64, false).is_err());
}
