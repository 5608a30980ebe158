//! Image decoding behind a substitutable seam.
//!
//! Decoding is a collaborator, not a concern of the component itself: bytes
//! or a path go in, a pixel buffer comes out. [`FileDecoder`] is the
//! production implementation built on the `image` crate; tests swap in a
//! canned decoder.

use crate::device::PixelFormat;
use std::path::Path;

/// A decoded image ready for GPU upload.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

/// Errors that can occur while decoding an image.
#[derive(Debug)]
pub enum DecodeError {
    /// File could not be read.
    Io(std::io::Error),
    /// File format could not be recognized.
    Unsupported(String),
    /// The image data was invalid or corrupt.
    Corrupt(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Io(e) => write!(f, "IO error: {}", e),
            DecodeError::Unsupported(msg) => write!(f, "unsupported image format: {}", msg),
            DecodeError::Corrupt(msg) => write!(f, "corrupt image data: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for DecodeError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => DecodeError::Io(io),
            image::ImageError::Unsupported(u) => DecodeError::Unsupported(u.to_string()),
            other => DecodeError::Corrupt(other.to_string()),
        }
    }
}

/// Decodes an image source into a pixel buffer.
pub trait ImageDecoder {
    /// Decode the image at `path`.
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError>;
}

impl<D: ImageDecoder + ?Sized> ImageDecoder for std::rc::Rc<D> {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        (**self).decode(path)
    }
}

/// Production decoder reading image files from disk.
///
/// Always converts to RGBA8, matching what the wgpu backend uploads.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(DecodedImage {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels: img.into_raw(),
        })
    }
}

/// Decode an image from an in-memory byte buffer.
///
/// Useful for embedded assets loaded with `include_bytes!`.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = img.dimensions();
    Ok(DecodedImage {
        width,
        height,
        format: PixelFormat::Rgba8,
        pixels: img.into_raw(),
    })
}
