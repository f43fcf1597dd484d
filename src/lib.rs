//! # render-core
//!
//! A thin Vulkan resource layer for a bindless renderer: 2D image wrappers
//! with staging-buffer upload/download and layout-transition tracking,
//! shader-shared bindless table records, and fixed engine capacity bounds.
//!
//! ## Features
//!
//! - **Image wrappers**: depth and RGBA 2D images owning image, memory,
//!   view, and (for sampled color) sampler, created fully initialized
//! - **Transfers**: synchronous host-to-device upload and device-to-host
//!   download through host-visible staging buffers
//! - **Layout tracking**: each color image tracks its current layout and
//!   derives barrier access masks and pipeline stages from a fixed policy
//! - **Bindless tables**: bit-exact geometry/instance records shared with
//!   shader code
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use render_core::{DeviceContext, RgbaImage2d};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = DeviceContext::new("my-renderer")?;
//!
//!     let mut texture = RgbaImage2d::<u8>::from_file(&ctx, "assets/albedo.png", true)?;
//!     let pixels = texture.download(&ctx)?;
//!     assert_eq!(
//!         pixels.len(),
//!         (texture.width() * texture.height() * 4) as usize
//!     );
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

/// Bindless table records shared with shaders
pub mod bindless;
/// GPU buffer and staging-buffer wrappers
pub mod buffer;
/// Command pool management
pub mod commands;
/// Device/queue context
pub mod context;
/// Error types
pub mod error;
/// Image resources
pub mod image;
/// Engine capacity constants
pub mod settings;

pub use bindless::{geometry_entry_index, BaseInstanceTableEntry, GeometryTableEntry};
pub use buffer::{Buffer, StagingBuffer};
pub use commands::CommandPool;
pub use context::{DeviceContext, LogicalDevice, PhysicalDeviceInfo, VulkanInstance};
pub use error::{RenderError, RenderResult};
pub use image::{DecodeRoute, DepthImage2d, PixelData, RgbaImage2d, TexelScalar};
pub use settings::EngineSettings;
