//! Feature points tracked by the AR session, drawn under the planes.

use crate::buffer::GrowableBuffer;
use serde::{Deserialize, Serialize};

/// `[x, y, z, confidence]`, world space.
pub type CloudPoint = [f32; 4];

pub const FLOATS_PER_POINT: usize = 4;
pub const INITIAL_BUFFER_POINTS: usize = 1000;

/// rgb(31, 188, 210).
pub const POINT_COLOR: [f32; 4] = [31.0 / 255.0, 188.0 / 255.0, 210.0 / 255.0, 1.0];

/// Point size on device, pixels.
pub const POINT_SIZE_PX: f32 = 5.0;

/// One point cloud snapshot. The timestamp identifies the snapshot: the same
/// timestamp means the same points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub timestamp: i64,
    #[serde(default)]
    pub points: Vec<CloudPoint>,
}

/// Last uploaded point cloud. Capacity doubles from
/// [`INITIAL_BUFFER_POINTS`] and never shrinks.
#[derive(Debug, Clone)]
pub struct PointCloudBuffer {
    points: GrowableBuffer<CloudPoint>,
    last_timestamp: Option<i64>,
}

impl Default for PointCloudBuffer {
    fn default() -> Self {
        Self::new(INITIAL_BUFFER_POINTS)
    }
}

impl PointCloudBuffer {
    pub fn new(initial_points: usize) -> Self {
        Self {
            points: GrowableBuffer::with_capacity(initial_points),
            last_timestamp: None,
        }
    }

    /// Copies `cloud` in unless it is the snapshot already held.
    /// Returns `true` if the contents changed.
    pub fn update(&mut self, cloud: &PointCloud) -> bool {
        if self.last_timestamp == Some(cloud.timestamp) {
            return false;
        }
        self.last_timestamp = Some(cloud.timestamp);

        let n = cloud.points.len();
        self.points.ensure_capacity(n);
        self.points.reset(n);
        self.points.as_mut_slice().copy_from_slice(&cloud.points);
        true
    }

    pub fn points(&self) -> &[CloudPoint] {
        self.points.as_slice()
    }

    pub fn len(&self) -> usize {
        self.points.limit()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity in points.
    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.last_timestamp
    }
}
