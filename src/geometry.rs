//! 2D quad geometry for image rendering.
//!
//! Geometry here is plain data: a [`Vertex2d`] buffer in screen-space pixel
//! coordinates, grouped in triangles. [`build_quad`] emits a single
//! two-triangle rectangle; [`build_tiled`] covers a rectangle with a grid of
//! quads, each mapping the full source texture.
//!
//! Both builders are pure and deterministic — the same inputs always produce
//! byte-identical buffers. That lets the owning component rebuild geometry
//! on an origin change without touching its texture.

/// Vertex for 2D image rendering.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2d {
    /// Screen-space position in pixels.
    pub position: [f32; 2],
    /// Texture coordinates, (0,0) top-left to (1,1) bottom-right.
    pub uv: [f32; 2],
}

impl Vertex2d {
    /// The wgpu vertex buffer layout descriptor for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex2d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };
}

/// Append one textured rectangle as two triangles.
///
/// `u1`/`v1` are the uv extents so clipped tiles can map a matching fraction
/// of the source image.
fn push_rect(out: &mut Vec<Vertex2d>, x: f32, y: f32, w: f32, h: f32, u1: f32, v1: f32) {
    out.extend_from_slice(&[
        Vertex2d {
            position: [x, y],
            uv: [0.0, 0.0],
        },
        Vertex2d {
            position: [x + w, y],
            uv: [u1, 0.0],
        },
        Vertex2d {
            position: [x, y + h],
            uv: [0.0, v1],
        },
        Vertex2d {
            position: [x + w, y],
            uv: [u1, 0.0],
        },
        Vertex2d {
            position: [x + w, y + h],
            uv: [u1, v1],
        },
        Vertex2d {
            position: [x, y + h],
            uv: [0.0, v1],
        },
    ]);
}

/// Build a single quad of size `(w, h)` positioned so that the point
/// `(origin_x * w, origin_y * h)` sits at `(x, y)`.
///
/// Origin (0, 0) anchors the top-left corner at the position, (0.5, 0.5) the
/// center. Texture coordinates span the full (0,0)–(1,1) range.
pub fn build_quad(x: f32, y: f32, w: f32, h: f32, origin_x: f32, origin_y: f32) -> Vec<Vertex2d> {
    let left = x - origin_x * w;
    let top = y - origin_y * h;

    let mut vertices = Vec::with_capacity(6);
    push_rect(&mut vertices, left, top, w, h, 1.0, 1.0);
    vertices
}

/// Cover a `(w, h)` rectangle with a grid of `tile_w` × `tile_h` cells.
///
/// Each full cell is its own quad mapping the whole source image. The last
/// row and column may be fractional: those cells are clipped and their uv
/// extents scaled to the covered fraction, so the source is replicated
/// rather than stretched. The origin offset is applied once, to the whole
/// rectangle's placement, never per cell.
pub fn build_tiled(
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    tile_w: f32,
    tile_h: f32,
    origin_x: f32,
    origin_y: f32,
) -> Vec<Vertex2d> {
    if w <= 0.0 || h <= 0.0 || tile_w <= 0.0 || tile_h <= 0.0 {
        return Vec::new();
    }

    let left = x - origin_x * w;
    let top = y - origin_y * h;

    let cols = (w / tile_w).ceil() as u32;
    let rows = (h / tile_h).ceil() as u32;

    let mut vertices = Vec::with_capacity((cols * rows * 6) as usize);
    for row in 0..rows {
        let cy = row as f32 * tile_h;
        let ch = tile_h.min(h - cy);
        for col in 0..cols {
            let cx = col as f32 * tile_w;
            let cw = tile_w.min(w - cx);
            push_rect(
                &mut vertices,
                left + cx,
                top + cy,
                cw,
                ch,
                cw / tile_w,
                ch / tile_h,
            );
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(verts: &[Vertex2d]) -> Vec<[f32; 2]> {
        verts.iter().map(|v| v.position).collect()
    }

    #[test]
    fn quad_has_six_vertices_spanning_rect() {
        let verts = build_quad(10.0, 20.0, 100.0, 50.0, 0.0, 0.0);
        assert_eq!(verts.len(), 6);

        let pos = positions(&verts);
        assert!(pos.contains(&[10.0, 20.0]));
        assert!(pos.contains(&[110.0, 20.0]));
        assert!(pos.contains(&[10.0, 70.0]));
        assert!(pos.contains(&[110.0, 70.0]));
    }

    #[test]
    fn quad_uv_spans_unit_square() {
        let verts = build_quad(0.0, 0.0, 10.0, 10.0, 0.0, 0.0);
        let uvs: Vec<[f32; 2]> = verts.iter().map(|v| v.uv).collect();
        assert!(uvs.contains(&[0.0, 0.0]));
        assert!(uvs.contains(&[1.0, 0.0]));
        assert!(uvs.contains(&[0.0, 1.0]));
        assert!(uvs.contains(&[1.0, 1.0]));
    }

    #[test]
    fn quad_origin_shifts_placement() {
        // Centered origin: (50, 25) into the rect sits at (0, 0).
        let verts = build_quad(0.0, 0.0, 100.0, 50.0, 0.5, 0.5);
        let pos = positions(&verts);
        assert!(pos.contains(&[-50.0, -25.0]));
        assert!(pos.contains(&[50.0, 25.0]));
    }

    #[test]
    fn quad_is_deterministic() {
        let a = build_quad(3.0, 7.0, 64.0, 48.0, 0.25, 0.75);
        let b = build_quad(3.0, 7.0, 64.0, 48.0, 0.25, 0.75);
        assert_eq!(a, b);
        assert_eq!(
            bytemuck::cast_slice::<_, u8>(&a),
            bytemuck::cast_slice::<_, u8>(&b)
        );
    }

    #[test]
    fn tiled_exact_grid() {
        // 2x2 grid of full cells.
        let verts = build_tiled(0.0, 0.0, 64.0, 64.0, 32.0, 32.0, 0.0, 0.0);
        assert_eq!(verts.len(), 4 * 6);
        // Every full cell maps the complete source image.
        assert!(verts.iter().all(|v| v.uv[0] <= 1.0 && v.uv[1] <= 1.0));
        assert!(verts.iter().any(|v| v.uv == [1.0, 1.0]));
    }

    #[test]
    fn tiled_collapses_to_single_quad_for_large_cells() {
        // Cell size >= rect: exactly one (clipped) quad, same count as plain.
        let verts = build_tiled(0.0, 0.0, 50.0, 50.0, 64.0, 64.0, 0.0, 0.0);
        assert_eq!(verts.len(), 6);
        // The clipped cell samples only the covered fraction of the source.
        let max_u = verts.iter().map(|v| v.uv[0]).fold(0.0f32, f32::max);
        let max_v = verts.iter().map(|v| v.uv[1]).fold(0.0f32, f32::max);
        assert!((max_u - 50.0 / 64.0).abs() < 1e-6);
        assert!((max_v - 50.0 / 64.0).abs() < 1e-6);
    }

    #[test]
    fn tiled_clips_fractional_last_column() {
        // 3 columns, the last one half-width; single row.
        let verts = build_tiled(0.0, 0.0, 80.0, 32.0, 32.0, 32.0, 0.0, 0.0);
        assert_eq!(verts.len(), 3 * 6);

        let max_x = verts
            .iter()
            .map(|v| v.position[0])
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(max_x, 80.0);

        // The clipped column covers 16/32 of the source horizontally.
        let last = &verts[2 * 6..];
        let max_u = last.iter().map(|v| v.uv[0]).fold(0.0f32, f32::max);
        assert!((max_u - 0.5).abs() < 1e-6);
    }

    #[test]
    fn tiled_origin_applies_to_whole_rect() {
        let anchored = build_tiled(100.0, 100.0, 64.0, 64.0, 32.0, 32.0, 1.0, 1.0);
        let plain = build_tiled(36.0, 36.0, 64.0, 64.0, 32.0, 32.0, 0.0, 0.0);
        assert_eq!(anchored, plain);
    }

    #[test]
    fn tiled_rejects_degenerate_input() {
        assert!(build_tiled(0.0, 0.0, 0.0, 64.0, 32.0, 32.0, 0.0, 0.0).is_empty());
        assert!(build_tiled(0.0, 0.0, 64.0, 64.0, 0.0, 32.0, 0.0, 0.0).is_empty());
    }
}
