//! The render device seam.
//!
//! Components never talk to wgpu directly; they go through [`RenderDevice`],
//! which covers exactly the operations an image component needs: texture
//! creation and destruction, validity queries, and issuing geometry. Keeping
//! the device an explicit dependency (instead of an ambient global) is what
//! lets tests substitute a fake device and simulate context loss.
//!
//! # Handle lifetime
//!
//! A [`TextureHandle`] never outlives the device context that created it.
//! The handle carries the device generation it was created under; when the
//! context is torn down and rebuilt, the generation moves on and every
//! outstanding handle silently becomes stale. Destroying a stale handle is
//! a no-op, never an error.

use crate::geometry::Vertex2d;

/// Opaque reference to one GPU texture.
///
/// Exclusively owned by one component instance; never shared, never cached.
/// The generation ties the handle to the device context that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

/// Pixel layout of a decoded image buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit RGBA, 4 bytes per pixel.
    Rgba8,
    /// 8-bit RGB, 3 bytes per pixel. Not every backend accepts this.
    Rgb8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// Errors raised when the device rejects a texture allocation.
#[derive(Debug)]
pub enum DeviceError {
    /// Width or height is zero or exceeds the device limit.
    InvalidDimensions { width: u32, height: u32 },
    /// The backend cannot upload this pixel format.
    UnsupportedFormat(PixelFormat),
    /// The pixel buffer length does not match width × height × bpp.
    BufferSizeMismatch { expected: usize, actual: usize },
    /// The device ran out of memory for the allocation.
    OutOfMemory,
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::InvalidDimensions { width, height } => {
                write!(f, "invalid texture dimensions: {}x{}", width, height)
            }
            DeviceError::UnsupportedFormat(format) => {
                write!(f, "unsupported pixel format: {:?}", format)
            }
            DeviceError::BufferSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "pixel buffer size mismatch: expected {} bytes, got {}",
                    expected, actual
                )
            }
            DeviceError::OutOfMemory => write!(f, "device out of memory"),
        }
    }
}

impl std::error::Error for DeviceError {}

/// The operations an image component needs from the renderer.
///
/// Implemented by [`WgpuDevice`](crate::WgpuDevice) for real rendering and
/// by a fake in tests.
pub trait RenderDevice {
    /// Upload a pixel buffer as a new GPU texture.
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        bytes: &[u8],
    ) -> Result<TextureHandle, DeviceError>;

    /// Destroy a texture. Idempotent: stale, already-destroyed, or
    /// never-issued handles are silently ignored.
    fn destroy_texture(&mut self, handle: TextureHandle);

    /// Whether the handle refers to a live texture in the current device
    /// generation.
    fn texture_is_valid(&self, handle: TextureHandle) -> bool;

    /// Select the texture for subsequent [`draw`](Self::draw) calls.
    fn bind_texture(&mut self, handle: TextureHandle);

    /// Queue a triangle-list vertex buffer for drawing with the currently
    /// bound texture.
    fn draw(&mut self, vertices: &[Vertex2d]);
}
