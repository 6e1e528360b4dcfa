//! Growable vertex/index storage reused across planes and frames.

use bytemuck::Zeroable;

/// Floats per vertex: x, z, alpha.
pub const COORDS_PER_VERTEX: usize = 3;
/// Each boundary point yields an outer and an inset vertex.
pub const VERTS_PER_BOUNDARY_VERT: usize = 2;
/// Each boundary point contributes three strip indices.
pub const INDICES_PER_BOUNDARY_VERT: usize = 3;
/// Boundary points the buffers are sized for before the first growth.
pub const INITIAL_BUFFER_BOUNDARY_VERTS: usize = 64;

/// One strip vertex as laid out in the vertex buffer.
/// Must match the `Float32x3` attribute of the plane shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneVertex {
    pub x: f32,
    pub z: f32,
    pub alpha: f32,
}

// Compile-time check: the vertex is exactly three packed floats.
const _: [(); 12] = [(); core::mem::size_of::<PlaneVertex>()];

/// Backing storage with a logical `limit`. Capacity only ever grows.
#[derive(Debug, Clone)]
pub struct GrowableBuffer<T> {
    data: Vec<T>,
    limit: usize,
}

impl<T: Copy + Zeroable> GrowableBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![T::zeroed(); capacity],
            limit: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Doubles the capacity until it holds `required` elements, then reallocates.
    /// Returns `true` if a reallocation happened. Contents are not preserved;
    /// callers rewrite the whole buffer after growing.
    pub fn ensure_capacity(&mut self, required: usize) -> bool {
        let mut size = self.capacity();
        if size >= required {
            return false;
        }

        size = size.max(1);
        while size < required {
            size *= 2;
        }

        log::debug!(
            "growing {} buffer: {} -> {} elements",
            std::any::type_name::<T>(),
            self.capacity(),
            size
        );
        self.data = vec![T::zeroed(); size];
        true
    }

    /// Starts a regeneration with `limit` logical elements.
    #[inline]
    pub fn reset(&mut self, limit: usize) {
        debug_assert!(limit <= self.capacity());
        self.limit = limit;
    }

    /// The writable logical region.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data[..self.limit]
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.limit]
    }
}

/// Vertex and index buffers for one plane's strip. Overwritten for every plane
/// drawn; never read across frames.
#[derive(Debug, Clone)]
pub struct GeometryBuffer {
    vertices: GrowableBuffer<f32>,
    indices: GrowableBuffer<u16>,
}

impl Default for GeometryBuffer {
    fn default() -> Self {
        Self::new(INITIAL_BUFFER_BOUNDARY_VERTS)
    }
}

impl GeometryBuffer {
    /// Sizes both buffers for `boundary_verts` boundary points.
    pub fn new(boundary_verts: usize) -> Self {
        let vertex_floats = COORDS_PER_VERTEX * VERTS_PER_BOUNDARY_VERT * boundary_verts;
        // Index sizing keeps the historical 3 * 3 * n allocation; growth covers any shortfall.
        let index_count = INDICES_PER_BOUNDARY_VERT * INDICES_PER_BOUNDARY_VERT * boundary_verts;

        Self {
            vertices: GrowableBuffer::with_capacity(vertex_floats),
            indices: GrowableBuffer::with_capacity(index_count),
        }
    }

    /// Nothing to draw.
    pub fn clear(&mut self) {
        self.vertices.reset(0);
        self.indices.reset(0);
    }

    /// Grows as needed and sets the logical lengths for a new mesh of
    /// `vertex_count` vertices and `index_count` indices.
    pub fn prepare(&mut self, vertex_count: usize, index_count: usize) {
        let floats = vertex_count * COORDS_PER_VERTEX;
        self.vertices.ensure_capacity(floats);
        self.vertices.reset(floats);

        self.indices.ensure_capacity(index_count);
        self.indices.reset(index_count);
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertices.capacity()
    }

    pub fn index_capacity(&self) -> usize {
        self.indices.capacity()
    }

    /// Raw interleaved floats `(x, z, alpha)*`.
    pub fn vertex_floats(&self) -> &[f32] {
        self.vertices.as_slice()
    }

    pub fn vertices(&self) -> &[PlaneVertex] {
        bytemuck::cast_slice(self.vertices.as_slice())
    }

    pub fn indices(&self) -> &[u16] {
        self.indices.as_slice()
    }

    pub(crate) fn vertex_floats_mut(&mut self) -> &mut [f32] {
        self.vertices.as_mut_slice()
    }

    pub(crate) fn indices_mut(&mut self) -> &mut [u16] {
        self.indices.as_mut_slice()
    }
}
