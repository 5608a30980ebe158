//! # Retroframe
//!
//! **GPU image components for an emulator frontend.**
//!
//! The heart of this crate is [`RenderableImage`]: a scene-graph component
//! that turns an image file into GPU-resident geometry and a texture,
//! resizes it under flexible constraints, optionally tiles it, and survives
//! the renderer's device being torn down and rebuilt mid-session
//! (fullscreen toggles, context loss).
//!
//! ## Quick Start
//!
//! ```no_run
//! use retroframe::{Component, GpuContext, RenderableImage, WgpuDevice};
//! # fn window() -> std::sync::Arc<winit::window::Window> { unimplemented!() }
//!
//! let gpu = GpuContext::new(window());
//! let mut device = WgpuDevice::new(gpu);
//!
//! // Box art scaled down to fit 400px wide, aspect preserved.
//! let mut boxart = RenderableImage::new(24.0, 48.0, 400, 0, false);
//! if let Err(e) = boxart.set_image(&mut device, "boxart/outrun.png") {
//!     // Non-fatal: the component is empty and draws nothing.
//!     log::warn!("box art unavailable: {e}");
//! }
//! boxart.set_origin(0.5, 0.0);
//!
//! // Each frame:
//! boxart.on_render(&mut device);
//! // ...then flush the device's batches into your render pass.
//! ```
//!
//! ## Device lifecycle
//!
//! Texture handles never outlive the device context that created them. The
//! host delivers teardown/rebuild boundaries to every component through
//! [`Component::on_deinit`] and [`Component::on_init`]; a component whose
//! handle went stale (for either reason) reloads itself from its stored
//! path on the next `on_init`. Each component exclusively owns its texture
//! — there is no cross-instance caching or sharing.

mod component;
mod decoder;
mod device;
mod geometry;
mod size_policy;
mod texture;
mod wgpu_device;

#[cfg(test)]
mod testing;

pub use component::{Component, LoadError, RenderableImage};
pub use decoder::{decode_bytes, DecodeError, DecodedImage, FileDecoder, ImageDecoder};
pub use device::{DeviceError, PixelFormat, RenderDevice, TextureHandle};
pub use geometry::{build_quad, build_tiled, Vertex2d};
pub use size_policy::compute as compute_render_size;
pub use texture::TextureManager;
pub use wgpu_device::{GpuContext, WgpuDevice};

// Re-export glam math types for convenience
pub use glam::Vec2;
