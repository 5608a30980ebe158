//! The renderable image component and the scene-graph capability trait.
//!
//! [`RenderableImage`] owns one image's texture, size, and geometry
//! lifecycle: it decodes a file, resolves its on-screen size under the
//! configured constraints, builds quad (or tile-grid) geometry, and uploads
//! a texture it exclusively owns. The host scene graph drives it through
//! [`Component`]: `on_init`/`on_deinit` at rendering-surface lifecycle
//! boundaries, `on_render` once per frame.
//!
//! Everything is synchronous — a call either completes or fails before it
//! returns. Load failures degrade the component to an empty, zero-size,
//! non-drawing state and are never fatal to the host.

use crate::decoder::{DecodeError, FileDecoder, ImageDecoder};
use crate::device::{DeviceError, RenderDevice};
use crate::geometry::{self, Vertex2d};
use crate::size_policy;
use crate::texture::TextureManager;
use glam::Vec2;
use std::path::{Path, PathBuf};

/// Capability interface for components in the scene tree.
///
/// The host invokes `on_init`/`on_deinit` when the rendering surface is
/// built or torn down, and `on_render` once per frame. Width and height are
/// in the parent-relative pixel space, origin at top-left.
pub trait Component {
    /// The rendering surface was (re)built. Components reacquire any GPU
    /// resources they lost.
    fn on_init(&mut self, device: &mut dyn RenderDevice);

    /// The rendering surface is going away. Components release their GPU
    /// resources but keep enough state to restore them in `on_init`.
    fn on_deinit(&mut self, device: &mut dyn RenderDevice);

    /// Draw this component for the current frame.
    fn on_render(&mut self, device: &mut dyn RenderDevice);

    /// Render width in pixels. May differ from the source texture width.
    fn width(&self) -> u32;

    /// Render height in pixels. May differ from the source texture height.
    fn height(&self) -> u32;
}

/// A failed image load.
///
/// Returned from [`RenderableImage::set_image`] so callers can react, but
/// ignoring it is always safe — the component has already degraded to its
/// empty state.
#[derive(Debug)]
pub enum LoadError {
    /// The source file could not be decoded.
    Decode(DecodeError),
    /// The device rejected the texture upload.
    Device(DeviceError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Decode(e) => write!(f, "decode failed: {}", e),
            LoadError::Device(e) => write!(f, "texture upload failed: {}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Decode(e) => Some(e),
            LoadError::Device(e) => Some(e),
        }
    }
}

impl From<DecodeError> for LoadError {
    fn from(e: DecodeError) -> Self {
        LoadError::Decode(e)
    }
}

impl From<DeviceError> for LoadError {
    fn from(e: DeviceError) -> Self {
        LoadError::Device(e)
    }
}

/// A component that renders one image file as GPU geometry plus a texture.
///
/// # Sizing
///
/// `max_width`/`max_height` bound the render size (0 means unconstrained on
/// that axis). With `resize_exact` the image is stretched to the bounds;
/// without it the image is only ever downscaled, uniformly, to fit. See
/// [`size_policy::compute`] for the exact rules.
///
/// # Device teardown
///
/// Textures are released on [`on_deinit`](Component::on_deinit) and
/// recreated on [`on_init`](Component::on_init) from the stored path. An
/// external context loss that skipped `on_deinit` is handled identically:
/// `on_init` reloads whenever the held handle is no longer valid.
pub struct RenderableImage {
    path: Option<PathBuf>,
    position: Vec2,
    origin: Vec2,
    max_width: u32,
    max_height: u32,
    resize_exact: bool,
    tiled: bool,
    natural_size: (u32, u32),
    render_size: (u32, u32),
    geometry: Vec<Vertex2d>,
    texture: TextureManager,
    decoder: Box<dyn ImageDecoder>,
}

impl RenderableImage {
    /// Create an empty image component at the given parent-relative offset.
    ///
    /// Nothing is decoded or uploaded until [`set_image`](Self::set_image)
    /// is called. Decoding defaults to [`FileDecoder`].
    pub fn new(
        offset_x: f32,
        offset_y: f32,
        max_width: u32,
        max_height: u32,
        resize_exact: bool,
    ) -> Self {
        Self {
            path: None,
            position: Vec2::new(offset_x, offset_y),
            origin: Vec2::ZERO,
            max_width,
            max_height,
            resize_exact,
            tiled: false,
            natural_size: (0, 0),
            render_size: (0, 0),
            geometry: Vec::new(),
            texture: TextureManager::new(),
            decoder: Box::new(FileDecoder),
        }
    }

    /// Create a component and immediately load `path`.
    ///
    /// A failed load is logged and leaves the component empty; it is not an
    /// error to construct with a path that does not decode.
    pub fn with_image(
        device: &mut dyn RenderDevice,
        offset_x: f32,
        offset_y: f32,
        path: impl AsRef<Path>,
        max_width: u32,
        max_height: u32,
        resize_exact: bool,
    ) -> Self {
        let mut component = Self::new(offset_x, offset_y, max_width, max_height, resize_exact);
        // set_image has already logged and degraded on failure.
        let _ = component.set_image(device, path);
        component
    }

    /// Replace the default decoder. Intended for tests and embedded-asset
    /// setups; must be called before the first load.
    pub fn with_decoder(mut self, decoder: Box<dyn ImageDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Load the image at `path`, replacing any current image.
    ///
    /// Decode, sizing, geometry build, and texture upload all complete
    /// before this returns. An empty path unloads the current image. On
    /// failure the component degrades to its empty state: zero render size,
    /// no geometry, no texture, no stored path.
    pub fn set_image(
        &mut self,
        device: &mut dyn RenderDevice,
        path: impl AsRef<Path>,
    ) -> Result<(), LoadError> {
        let path = path.as_ref();
        self.texture.release(device);

        if path.as_os_str().is_empty() {
            self.clear();
            return Ok(());
        }
        self.load(device, path.to_owned())
    }

    /// Set the anchor point as a fraction of the render size.
    ///
    /// (0, 0) is the top-left corner, (0.5, 0.5) the center. Only geometry
    /// is rebuilt — never the texture — so this is cheap to call in any
    /// state, including before any image is loaded.
    pub fn set_origin(&mut self, origin_x: f32, origin_y: f32) {
        self.origin = Vec2::new(origin_x, origin_y).clamp(Vec2::ZERO, Vec2::ONE);
        self.rebuild_geometry();
    }

    /// Move the component to a new parent-relative offset. Geometry only.
    pub fn set_position(&mut self, offset_x: f32, offset_y: f32) {
        self.position = Vec2::new(offset_x, offset_y);
        self.rebuild_geometry();
    }

    /// Enable or disable tiling.
    ///
    /// Must be called before the first [`set_image`](Self::set_image).
    /// Calling it while an image is loaded leaves the current geometry in
    /// its previous configuration until the next `set_image`; there is no
    /// silent rebuild.
    pub fn set_tiling(&mut self, tile: bool) {
        self.tiled = tile;
    }

    /// The currently stored image path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The current anchor point.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Whether a live texture is held on the given device.
    pub fn is_loaded(&self, device: &dyn RenderDevice) -> bool {
        self.texture.is_valid(device)
    }

    fn load(&mut self, device: &mut dyn RenderDevice, path: PathBuf) -> Result<(), LoadError> {
        let decoded = match self.decoder.decode(&path) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("failed to decode image {}: {}", path.display(), e);
                self.clear();
                return Err(e.into());
            }
        };

        self.natural_size = (decoded.width, decoded.height);
        self.render_size = size_policy::compute(
            decoded.width,
            decoded.height,
            self.max_width,
            self.max_height,
            self.resize_exact,
        );
        self.rebuild_geometry();

        if let Err(e) = self.texture.upload(device, &decoded) {
            log::warn!("failed to upload texture for {}: {}", path.display(), e);
            self.clear();
            return Err(e.into());
        }

        log::debug!(
            "loaded {} ({}x{} -> {}x{})",
            path.display(),
            decoded.width,
            decoded.height,
            self.render_size.0,
            self.render_size.1
        );
        self.path = Some(path);
        Ok(())
    }

    /// Degrade to the empty state. The texture has already been released
    /// (or was never valid) on every path that gets here.
    fn clear(&mut self) {
        self.path = None;
        self.natural_size = (0, 0);
        self.render_size = (0, 0);
        self.geometry.clear();
    }

    /// Rebuild the vertex buffer from current placement state.
    ///
    /// When tiling is enabled the grid always covers the final render size,
    /// with natural-size cells — so a tiled image under a shrinking
    /// constraint collapses toward a single clipped cell.
    fn rebuild_geometry(&mut self) {
        let (w, h) = self.render_size;
        if w == 0 || h == 0 {
            self.geometry.clear();
            return;
        }

        self.geometry = if self.tiled {
            let (tile_w, tile_h) = self.natural_size;
            geometry::build_tiled(
                self.position.x,
                self.position.y,
                w as f32,
                h as f32,
                tile_w as f32,
                tile_h as f32,
                self.origin.x,
                self.origin.y,
            )
        } else {
            geometry::build_quad(
                self.position.x,
                self.position.y,
                w as f32,
                h as f32,
                self.origin.x,
                self.origin.y,
            )
        };
    }
}

impl Component for RenderableImage {
    fn on_init(&mut self, device: &mut dyn RenderDevice) {
        // A valid handle means nothing was lost; do not redecode or
        // re-upload. Invalidity is treated uniformly whether it came from
        // on_deinit or an external context loss.
        if self.texture.is_valid(device) {
            return;
        }
        if let Some(path) = self.path.take() {
            if let Err(e) = self.load(device, path) {
                log::warn!("failed to restore image after device rebuild: {}", e);
            }
        }
    }

    fn on_deinit(&mut self, device: &mut dyn RenderDevice) {
        // Path, constraints, render size and geometry stay behind so
        // on_init can bring the texture back.
        self.texture.release(device);
    }

    fn on_render(&mut self, device: &mut dyn RenderDevice) {
        let (w, h) = self.render_size;
        if w == 0 || h == 0 || self.geometry.is_empty() {
            return;
        }
        let Some(handle) = self.texture.handle() else {
            return;
        };
        if !device.texture_is_valid(handle) {
            return;
        }

        device.bind_texture(handle);
        device.draw(&self.geometry);
    }

    fn width(&self) -> u32 {
        self.render_size.0
    }

    fn height(&self) -> u32 {
        self.render_size.1
    }
}

impl std::fmt::Debug for RenderableImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderableImage")
            .field("path", &self.path)
            .field("position", &self.position)
            .field("origin", &self.origin)
            .field("render_size", &self.render_size)
            .field("tiled", &self.tiled)
            .finish_non_exhaustive()
    }
}
