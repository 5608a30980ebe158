//! Test doubles for the device and decoder seams.
//!
//! Compiled only for tests. [`FakeDevice`] records texture and draw traffic
//! and can simulate allocation failure and context loss; [`FakeDecoder`]
//! serves canned pixel buffers without touching the filesystem.

use crate::decoder::{DecodeError, DecodedImage, ImageDecoder};
use crate::device::{DeviceError, PixelFormat, RenderDevice, TextureHandle};
use crate::geometry::Vertex2d;
use std::cell::RefCell;
use std::path::Path;

/// In-memory device that mimics the handle/generation contract of the real
/// backend.
///
/// Destroys of stale or unknown handles are ignored (and not counted), the
/// same silent no-op the wgpu backend guarantees.
pub struct FakeDevice {
    slots: Vec<bool>,
    generation: u32,
    fail_next: Option<DeviceError>,
    creates: usize,
    destroys: usize,
    binds: Vec<TextureHandle>,
    draws: Vec<Vec<Vertex2d>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: 0,
            fail_next: None,
            creates: 0,
            destroys: 0,
            binds: Vec::new(),
            draws: Vec::new(),
        }
    }

    /// Make the next `create_texture` call fail with the given error.
    pub fn fail_next_create(&mut self, err: DeviceError) {
        self.fail_next = Some(err);
    }

    /// Simulate external context teardown and rebuild: every outstanding
    /// handle becomes stale, the slot table starts over.
    pub fn lose_device(&mut self) {
        self.slots.clear();
        self.generation += 1;
    }

    pub fn create_calls(&self) -> usize {
        self.creates
    }

    /// Destroys that actually freed a live texture.
    pub fn destroy_calls(&self) -> usize {
        self.destroys
    }

    pub fn live_texture_count(&self) -> usize {
        self.slots.iter().filter(|live| **live).count()
    }

    pub fn bound_textures(&self) -> &[TextureHandle] {
        &self.binds
    }

    pub fn draw_calls(&self) -> &[Vec<Vertex2d>] {
        &self.draws
    }
}

impl RenderDevice for FakeDevice {
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        bytes: &[u8],
    ) -> Result<TextureHandle, DeviceError> {
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        if width == 0 || height == 0 {
            return Err(DeviceError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if bytes.len() != expected {
            return Err(DeviceError::BufferSizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        self.creates += 1;
        let slot = self.slots.len() as u32;
        self.slots.push(true);
        Ok(TextureHandle {
            slot,
            generation: self.generation,
        })
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        if handle.generation != self.generation {
            return;
        }
        if let Some(live) = self.slots.get_mut(handle.slot as usize) {
            if *live {
                *live = false;
                self.destroys += 1;
            }
        }
    }

    fn texture_is_valid(&self, handle: TextureHandle) -> bool {
        handle.generation == self.generation
            && self
                .slots
                .get(handle.slot as usize)
                .copied()
                .unwrap_or(false)
    }

    fn bind_texture(&mut self, handle: TextureHandle) {
        self.binds.push(handle);
    }

    fn draw(&mut self, vertices: &[Vertex2d]) {
        self.draws.push(vertices.to_vec());
    }
}

/// Decoder returning a canned image for any path, or a forced error.
pub struct FakeDecoder {
    result: RefCell<Result<DecodedImage, &'static str>>,
    decode_calls: RefCell<usize>,
}

impl FakeDecoder {
    /// Decoder producing a `width` × `height` RGBA image for any path.
    pub fn rgba(width: u32, height: u32) -> Self {
        Self {
            result: RefCell::new(Ok(DecodedImage {
                width,
                height,
                format: PixelFormat::Rgba8,
                pixels: vec![0xab; (width * height * 4) as usize],
            })),
            decode_calls: RefCell::new(0),
        }
    }

    /// Decoder failing every call.
    pub fn failing(reason: &'static str) -> Self {
        Self {
            result: RefCell::new(Err(reason)),
            decode_calls: RefCell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.decode_calls.borrow()
    }
}

impl ImageDecoder for FakeDecoder {
    fn decode(&self, _path: &Path) -> Result<DecodedImage, DecodeError> {
        *self.decode_calls.borrow_mut() += 1;
        self.result
            .borrow()
            .clone()
            .map_err(|reason| DecodeError::Corrupt(reason.to_string()))
    }
}
