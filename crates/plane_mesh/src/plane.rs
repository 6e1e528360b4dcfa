//! Tracked planes as handed over by the tracking subsystem. The core only reads them.

use crate::pose::Pose;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque identity of a tracked plane, stable across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaneId(pub u64);

impl std::fmt::Display for PlaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "plane#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    Tracking,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPlane {
    pub id: PlaneId,
    /// Center of the plane; its local Y axis is the plane normal.
    pub center_pose: Pose,
    /// Bounding extent along the local X axis, meters.
    pub extent_x: f32,
    /// Bounding extent along the local Z axis, meters.
    pub extent_z: f32,
    /// Boundary polygon as `(x, z)` points in the plane's local frame, closed implicitly.
    #[serde(default)]
    pub polygon: Option<Vec<Vec2>>,
    pub tracking_state: TrackingState,
    /// Set once another plane has absorbed this one.
    #[serde(default)]
    pub subsumed_by: Option<PlaneId>,
}

impl TrackedPlane {
    /// Tracking and not merged into another plane.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.tracking_state == TrackingState::Tracking && self.subsumed_by.is_none()
    }

    /// World-space normal: the transformed Y axis of the center pose.
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.center_pose.transformed_axis(1, 1.0)
    }

    pub fn boundary(&self) -> Option<&[Vec2]> {
        self.polygon.as_deref()
    }
}
