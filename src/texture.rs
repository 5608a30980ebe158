//! Per-component texture ownership.
//!
//! [`TextureManager`] owns the upload/release lifecycle of exactly one GPU
//! texture on behalf of one component instance. There is no caching and no
//! sharing — two components showing the same file each hold their own
//! texture.

use crate::decoder::DecodedImage;
use crate::device::{DeviceError, RenderDevice, TextureHandle};

/// Owns at most one texture handle and keeps it tied to the device
/// generation that issued it.
///
/// After an external device teardown the stored handle goes stale without
/// any call on this type; [`is_valid`](Self::is_valid) reports that, and
/// [`release`](Self::release) on a stale handle is a harmless no-op. The
/// owner discovers invalidity the next time it is told to rebuild — nothing
/// here polls device state.
#[derive(Debug, Default)]
pub struct TextureManager {
    handle: Option<TextureHandle>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Upload a decoded image, replacing any texture currently held.
    ///
    /// The previous texture (if any) is released first, so a failed upload
    /// leaves the manager empty rather than pointing at the old texture.
    pub fn upload(
        &mut self,
        device: &mut dyn RenderDevice,
        image: &DecodedImage,
    ) -> Result<TextureHandle, DeviceError> {
        self.release(device);
        let handle =
            device.create_texture(image.width, image.height, image.format, &image.pixels)?;
        self.handle = Some(handle);
        Ok(handle)
    }

    /// Release the held texture. Idempotent: repeated calls, or calls after
    /// the device was torn down externally, do nothing.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        if let Some(handle) = self.handle.take() {
            device.destroy_texture(handle);
        }
    }

    /// Whether a texture is held and still live in the current device
    /// generation.
    pub fn is_valid(&self, device: &dyn RenderDevice) -> bool {
        self.handle.is_some_and(|h| device.texture_is_valid(h))
    }

    /// The held handle, if any. May be stale; check [`is_valid`](Self::is_valid).
    pub fn handle(&self) -> Option<TextureHandle> {
        self.handle
    }
}
