//! plane_mesh: the geometry core behind drawing tracked AR planes.
//!
//! - Tessellates a plane's boundary polygon into an outer ring (alpha 0) and an
//!   inset ring (alpha 1), indexed as a single 16-bit triangle strip.
//! - Orders planes nearest-first by signed distance to the camera, which the
//!   alpha-mask occlusion blend relies on.
//! - Hands every plane a stable small index used to rotate its grid texture.
//! - Keeps the latest feature-point cloud, skipping repeated snapshots.
//!
//! Everything here runs on the thread that owns the graphics context, once per
//! frame. [`renderer::PlaneRenderer`] ties the pieces together.
//!
//! Vertex layout (per vertex, f32):
//!   0 : x      local plane X
//!   1 : z      local plane Z
//!   2 : alpha  0.0 on the boundary, 1.0 on the inset ring
//!
//! Index ceiling: indices are u16, so at most 65536 vertices, i.e.
//! [`tessellator::MAX_BOUNDARY_VERTICES`] boundary points per plane.

pub mod buffer;
pub mod compositing;
pub mod error;
pub mod identity;
pub mod plane;
pub mod points;
pub mod pose;
pub mod renderer;
pub mod sorter;
pub mod state;
pub mod tessellator;

pub use self::buffer::{GeometryBuffer, GrowableBuffer, PlaneVertex};
pub use self::compositing::{AlphaMaskCompositor, BlendPolicy, OCCLUSION_BLEND};
pub use self::error::MeshError;
pub use self::identity::PlaneIndexMap;
pub use self::plane::{PlaneId, TrackedPlane, TrackingState};
pub use self::points::{PointCloud, PointCloudBuffer};
pub use self::pose::Pose;
pub use self::renderer::{PlaneDraw, PlaneRenderer, PlaneRendererConfig};
pub use self::sorter::{sort_planes, SortablePlane};
pub use self::state::{ArState, ArStateTracker, TrackingFailureReason};
pub use self::tessellator::{BoundaryTessellator, PlaneMesh};
