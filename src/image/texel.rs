//! Scalar-to-format mapping for image texels
//!
//! The device format of an image is chosen once at construction from its
//! element scalar type and never changes afterwards.

use ash::vk;
use std::path::Path;

use crate::error::RenderResult;
use crate::image::loader::{DecodeRoute, PixelData};

mod private {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for u8 {}
}

/// Pixel scalar types supported by the image wrappers
///
/// Sealed: only `f32` (HDR / depth) and `u8` (LDR color) are valid texel
/// scalars.
pub trait TexelScalar: private::Sealed + bytemuck::Pod {
    /// Depth-attachment format for this scalar, if one exists
    const DEPTH_FORMAT: Option<vk::Format>;

    /// File-decode route that produces this scalar
    const DECODE_ROUTE: DecodeRoute;

    /// Whether file-loaded color data of this scalar is stored as sRGB
    const LOADS_AS_SRGB: bool;

    /// RGBA color format for this scalar
    ///
    /// The sRGB flag only affects 8-bit color; float RGBA is always linear.
    fn color_format(srgb: bool) -> vk::Format;

    /// Decode a file into RGBA pixel data of this scalar type
    fn decode_file(path: &Path) -> RenderResult<PixelData<Self>>;
}

impl TexelScalar for f32 {
    const DEPTH_FORMAT: Option<vk::Format> = Some(vk::Format::D32_SFLOAT);
    const DECODE_ROUTE: DecodeRoute = DecodeRoute::F32;
    const LOADS_AS_SRGB: bool = false;

    fn color_format(_srgb: bool) -> vk::Format {
        vk::Format::R32G32B32A32_SFLOAT
    }

    fn decode_file(path: &Path) -> RenderResult<PixelData<Self>> {
        PixelData::load_rgba32f(path)
    }
}

impl TexelScalar for u8 {
    const DEPTH_FORMAT: Option<vk::Format> = None;
    const DECODE_ROUTE: DecodeRoute = DecodeRoute::U8;
    const LOADS_AS_SRGB: bool = true;

    fn color_format(srgb: bool) -> vk::Format {
        if srgb {
            vk::Format::R8G8B8A8_SRGB
        } else {
            vk::Format::R8G8B8A8_UNORM
        }
    }

    fn decode_file(path: &Path) -> RenderResult<PixelData<Self>> {
        PixelData::load_rgba8(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_scalar_maps_to_float_formats() {
        assert_eq!(f32::DEPTH_FORMAT, Some(vk::Format::D32_SFLOAT));
        assert_eq!(f32::color_format(false), vk::Format::R32G32B32A32_SFLOAT);
        // sRGB flag has no effect on float color
        assert_eq!(f32::color_format(true), vk::Format::R32G32B32A32_SFLOAT);
    }

    #[test]
    fn u8_scalar_maps_to_rgba8_formats() {
        assert_eq!(u8::color_format(false), vk::Format::R8G8B8A8_UNORM);
        assert_eq!(u8::color_format(true), vk::Format::R8G8B8A8_SRGB);
    }

    #[test]
    fn u8_scalar_has_no_depth_format() {
        assert_eq!(u8::DEPTH_FORMAT, None);
    }

    #[test]
    fn decode_routes_match_scalars() {
        assert_eq!(f32::DECODE_ROUTE, DecodeRoute::F32);
        assert_eq!(u8::DECODE_ROUTE, DecodeRoute::U8);
    }
}
