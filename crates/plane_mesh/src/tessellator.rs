// Builds the fading-edge triangle strip for a plane boundary polygon.

use crate::buffer::{
    GeometryBuffer, PlaneVertex, COORDS_PER_VERTEX, INDICES_PER_BOUNDARY_VERT,
    VERTS_PER_BOUNDARY_VERT,
};
use crate::error::MeshError;
use glam::Vec2;

/// Width of the band (meters) over which a plane fades out towards its boundary.
pub const FADE_RADIUS_M: f32 = 0.25;

/// Vertices addressable by a u16 index.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Boundary points that still fit [`MAX_VERTICES`].
pub const MAX_BOUNDARY_VERTICES: usize = MAX_VERTICES / VERTS_PER_BOUNDARY_VERT;

/// Scale that pushes the inset ring `fade_radius` inwards from both sides of
/// an axis. Clamps to zero when the extent is no wider than the fade band.
#[inline]
pub fn inset_scale(extent: f32, fade_radius: f32) -> f32 {
    ((extent - 2.0 * fade_radius) / extent).max(0.0)
}

/// The strip currently held by a [`BoundaryTessellator`].
#[derive(Debug, Clone, Copy)]
pub struct PlaneMesh<'a> {
    pub vertices: &'a [PlaneVertex],
    pub indices: &'a [u16],
    pub x_scale: f32,
    pub z_scale: f32,
}

impl PlaneMesh<'_> {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct BoundaryTessellator {
    fade_radius_m: f32,
    buffer: GeometryBuffer,
    x_scale: f32,
    z_scale: f32,
}

impl Default for BoundaryTessellator {
    fn default() -> Self {
        Self::new(FADE_RADIUS_M, GeometryBuffer::default())
    }
}

impl BoundaryTessellator {
    pub fn new(fade_radius_m: f32, buffer: GeometryBuffer) -> Self {
        Self {
            fade_radius_m,
            buffer,
            x_scale: 0.0,
            z_scale: 0.0,
        }
    }

    pub fn fade_radius_m(&self) -> f32 {
        self.fade_radius_m
    }

    pub fn buffer(&self) -> &GeometryBuffer {
        &self.buffer
    }

    /// The most recently generated strip.
    pub fn mesh(&self) -> PlaneMesh<'_> {
        PlaneMesh {
            vertices: self.buffer.vertices(),
            indices: self.buffer.indices(),
            x_scale: self.x_scale,
            z_scale: self.z_scale,
        }
    }

    /// Regenerates the buffers for `boundary`.
    ///
    /// An absent boundary, or one with fewer than three points, leaves both
    /// buffers empty. Boundaries beyond [`MAX_BOUNDARY_VERTICES`] are rejected
    /// and also leave the buffers empty.
    pub fn tessellate(
        &mut self,
        boundary: Option<&[Vec2]>,
        extent_x: f32,
        extent_z: f32,
    ) -> Result<PlaneMesh<'_>, MeshError> {
        self.x_scale = 0.0;
        self.z_scale = 0.0;

        let boundary = match boundary {
            Some(b) if b.len() >= 3 => b,
            _ => {
                self.buffer.clear();
                return Ok(self.mesh());
            }
        };

        let n = boundary.len();
        if n > MAX_BOUNDARY_VERTICES {
            self.buffer.clear();
            return Err(MeshError::TooManyVertices {
                boundary_vertices: n,
                max: MAX_BOUNDARY_VERTICES,
            });
        }

        let num_vertices = n * VERTS_PER_BOUNDARY_VERT;
        // Drawn as a triangle strip with 3n - 2 triangles (n - 2 fill, 2n perimeter).
        let num_indices = n * INDICES_PER_BOUNDARY_VERT;
        self.buffer.prepare(num_vertices, num_indices);

        // Narrow planes collapse the inset ring onto the center line; the
        // resulting zero-area triangles rasterize to nothing.
        self.x_scale = inset_scale(extent_x, self.fade_radius_m);
        self.z_scale = inset_scale(extent_z, self.fade_radius_m);
        write_vertices(
            self.buffer.vertex_floats_mut(),
            boundary,
            self.x_scale,
            self.z_scale,
        );

        let written = write_strip_indices(self.buffer.indices_mut(), n);
        debug_assert_eq!(written, num_indices);

        Ok(self.mesh())
    }
}

fn write_vertices(out: &mut [f32], boundary: &[Vec2], x_scale: f32, z_scale: f32) {
    let stride = COORDS_PER_VERTEX * VERTS_PER_BOUNDARY_VERT;
    for (dst, p) in out.chunks_exact_mut(stride).zip(boundary) {
        dst.copy_from_slice(&[p.x, p.y, 0.0, p.x * x_scale, p.y * z_scale, 1.0]);
    }
}

/// Writes the strip for `n` boundary points (outer vertex `2i`, inset `2i + 1`)
/// and returns the number of indices written.
fn write_strip_indices(out: &mut [u16], n: usize) -> usize {
    let mut k = 0usize;
    let mut put = |v: usize| {
        out[k] = v as u16;
        k += 1;
    };

    // Perimeter: walk the ring pairs, entering from the last outer vertex and
    // leaving on inset vertex 0.
    put((n - 1) * 2);
    for i in 0..n {
        put(i * 2);
        put(i * 2 + 1);
    }
    put(1);
    // Now on the inset edge between boundary points n-1 and 0.

    // Interior: zig-zag across the inset ring from both ends towards the middle.
    for i in 1..(n / 2) {
        put((n - 1 - i) * 2 + 1);
        put(i * 2 + 1);
    }
    if n % 2 != 0 {
        put((n / 2) * 2 + 1);
    }

    k
}
