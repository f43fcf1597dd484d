//! Image file decoding for texture upload
//!
//! Routes `.hdr` files to the floating-point decoder and everything else to
//! the 8-bit decoder, producing channel-interleaved RGBA data ready for GPU
//! upload.

use std::path::Path;

use crate::error::{RenderError, RenderResult};

/// Which decoder a file path routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeRoute {
    /// Floating-point RGBA decode (`.hdr` files)
    F32,
    /// 8-bit RGBA decode (everything else)
    U8,
}

impl DecodeRoute {
    /// Pick the decode route for a file path
    ///
    /// Routing is by extension only; a `.hdr` suffix always selects the float
    /// decoder regardless of the file's actual content.
    pub fn for_path(path: &Path) -> Self {
        let is_hdr = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("hdr"));
        if is_hdr {
            Self::F32
        } else {
            Self::U8
        }
    }
}

/// Decoded RGBA pixel data ready for GPU upload
#[derive(Debug, Clone)]
pub struct PixelData<T> {
    /// Channel-interleaved RGBA scalars, `width * height * 4` entries
    pub data: Vec<T>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl PixelData<u8> {
    /// Decode a file into 8-bit RGBA pixels
    pub fn load_rgba8(path: &Path) -> RenderResult<Self> {
        log::debug!("Loading image from: {:?}", path);

        let img = image::open(path).map_err(|e| RenderError::DecodeFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();
        check_dimensions(path, width, height)?;

        log::info!("Loaded image {}x{} from {:?}", width, height, path);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Create solid-color pixel data (useful for tests and default textures)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        Self {
            data,
            width,
            height,
        }
    }
}

impl PixelData<f32> {
    /// Decode a file into floating-point RGBA pixels
    pub fn load_rgba32f(path: &Path) -> RenderResult<Self> {
        log::debug!("Loading HDR image from: {:?}", path);

        let img = image::open(path).map_err(|e| RenderError::DecodeFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let rgba_img = img.to_rgba32f();
        let (width, height) = rgba_img.dimensions();
        check_dimensions(path, width, height)?;

        log::info!("Loaded HDR image {}x{} from {:?}", width, height, path);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }
}

impl<T> PixelData<T> {
    /// Size of the decoded data in scalars
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the decoded data is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn check_dimensions(path: &Path, width: u32, height: u32) -> RenderResult<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::DecodeFailed {
            path: path.to_path_buf(),
            reason: format!("non-positive dimensions {width}x{height}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hdr_extension_routes_to_float_decoder() {
        assert_eq!(DecodeRoute::for_path(Path::new("env/probe.hdr")), DecodeRoute::F32);
        assert_eq!(DecodeRoute::for_path(Path::new("PROBE.HDR")), DecodeRoute::F32);
    }

    #[test]
    fn other_extensions_route_to_u8_decoder() {
        assert_eq!(DecodeRoute::for_path(Path::new("albedo.png")), DecodeRoute::U8);
        assert_eq!(DecodeRoute::for_path(Path::new("photo.jpeg")), DecodeRoute::U8);
        assert_eq!(DecodeRoute::for_path(Path::new("no_extension")), DecodeRoute::U8);
        // routing looks at the suffix only, not the content
        assert_eq!(DecodeRoute::for_path(Path::new("actually_hdr.png")), DecodeRoute::U8);
    }

    #[test]
    fn solid_color_fills_interleaved_rgba() {
        let img = PixelData::solid_color(4, 4, [255, 0, 0, 255]);
        assert_eq!(img.width, 4);
        assert_eq!(img.height, 4);
        assert_eq!(img.len(), 4 * 4 * 4);
        assert_eq!(&img.data[0..4], &[255, 0, 0, 255]);
        assert_eq!(&img.data[60..64], &[255, 0, 0, 255]);
    }

    #[test]
    fn decode_of_missing_file_carries_path() {
        let err = PixelData::load_rgba8(Path::new("/nonexistent/texture.png")).unwrap_err();
        match err {
            crate::error::RenderError::DecodeFailed { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/texture.png"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
