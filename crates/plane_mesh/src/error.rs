/// Structural failures while building plane geometry. None of these are
/// transient; retrying with the same input fails the same way.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("boundary has {boundary_vertices} points but a 16-bit index buffer addresses at most {max} (65536 vertices)")]
    TooManyVertices {
        boundary_vertices: usize,
        max: usize,
    },
}
