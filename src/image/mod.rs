//! GPU image resources
//!
//! 2D depth and RGBA color image wrappers, the layout-transition policy they
//! share, and the file loaders that feed them.

/// Depth attachment images
pub mod depth;
/// Image layout transition policy
pub mod layout;
/// Image file decoding
pub mod loader;
/// RGBA color images
pub mod rgba;
/// Scalar-to-format mapping
pub mod texel;

pub use depth::DepthImage2d;
pub use layout::{access_mask, stage_flags};
pub use loader::{DecodeRoute, PixelData};
pub use rgba::{RgbaImage2d, CHANNELS};
pub use texel::TexelScalar;
