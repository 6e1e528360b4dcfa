use crate::plane::TrackedPlane;
use crate::pose::Pose;

/// A plane paired with its signed distance to the camera for one frame.
#[derive(Debug, Clone, Copy)]
pub struct SortablePlane<'a> {
    pub distance: f32,
    pub plane: &'a TrackedPlane,
}

/// Signed distance from the camera to the infinite plane through `plane_pose`.
///
/// `plane_pose` must have its Y axis along the plane normal (a plane's center
/// pose, or a hit-test pose). Negative means the camera is behind the plane.
#[inline]
pub fn distance_to_plane(plane_pose: &Pose, camera_pose: &Pose) -> f32 {
    let normal = plane_pose.transformed_axis(1, 1.0);
    (camera_pose.translation - plane_pose.translation).dot(normal)
}

/// Drawable planes facing the camera, nearest first.
///
/// Skips planes that are not tracking, planes subsumed by another plane and
/// back-facing planes. Equal distances keep their input order.
pub fn sort_planes<'a, I>(planes: I, camera_pose: &Pose) -> Vec<SortablePlane<'a>>
where
    I: IntoIterator<Item = &'a TrackedPlane>,
{
    let mut sorted: Vec<SortablePlane<'a>> = planes
        .into_iter()
        .filter(|plane| {
            let keep = plane.is_drawable();
            if !keep {
                log::trace!(
                    "{}: skipped ({:?}, subsumed_by={:?})",
                    plane.id,
                    plane.tracking_state,
                    plane.subsumed_by
                );
            }
            keep
        })
        .filter_map(|plane| {
            let distance = distance_to_plane(&plane.center_pose, camera_pose);
            if distance < 0.0 {
                log::trace!("{}: skipped (back-facing, d={:.3})", plane.id, distance);
                return None;
            }
            Some(SortablePlane { distance, plane })
        })
        .collect();

    // `sort_by` is stable.
    sorted.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::{PlaneId, TrackingState};
    use glam::{Quat, Vec3};

    fn floor_at(id: u64, y: f32) -> TrackedPlane {
        TrackedPlane {
            id: PlaneId(id),
            center_pose: Pose::from_translation(Vec3::new(0.0, y, 0.0)),
            extent_x: 1.0,
            extent_z: 1.0,
            polygon: None,
            tracking_state: TrackingState::Tracking,
            subsumed_by: None,
        }
    }

    fn ids(sorted: &[SortablePlane<'_>]) -> Vec<u64> {
        sorted.iter().map(|s| s.plane.id.0).collect()
    }

    #[test]
    fn test_distance_is_along_normal() {
        let camera = Pose::from_translation(Vec3::new(5.0, 1.5, -3.0));
        let floor = Pose::from_translation(Vec3::new(0.0, -0.5, 0.0));
        assert!((distance_to_plane(&floor, &camera) - 2.0).abs() < 1e-6);

        // A wall facing +X at x = 1.
        let wall = Pose::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_z(-std::f32::consts::FRAC_PI_2),
        );
        assert!((distance_to_plane(&wall, &camera) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_sorted_nearest_first() {
        let camera = Pose::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let planes = vec![floor_at(1, -3.0), floor_at(2, 1.5), floor_at(3, 0.0), floor_at(4, -1.0)];

        let sorted = sort_planes(&planes, &camera);
        assert_eq!(ids(&sorted), vec![2, 3, 4, 1]);
        assert!(sorted.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_filters_back_facing_and_untracked() {
        let camera = Pose::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let mut paused = floor_at(10, 0.0);
        paused.tracking_state = TrackingState::Paused;
        let mut stopped = floor_at(11, 0.0);
        stopped.tracking_state = TrackingState::Stopped;
        let mut merged = floor_at(12, 0.0);
        merged.subsumed_by = Some(PlaneId(13));
        let ceiling = floor_at(14, 2.0); // camera below it: back-facing
        let visible = floor_at(13, 0.0);

        let planes = vec![paused, stopped, merged, ceiling, visible];
        let sorted = sort_planes(&planes, &camera);
        assert_eq!(ids(&sorted), vec![13]);
        assert!(sorted.iter().all(|s| s.distance >= 0.0));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let camera = Pose::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let planes: Vec<_> = [5, 3, 9, 1, 7].iter().map(|&id| floor_at(id, 0.0)).collect();
        let sorted = sort_planes(&planes, &camera);
        assert_eq!(ids(&sorted), vec![5, 3, 9, 1, 7]);
    }

    #[test]
    fn test_camera_on_plane_is_kept() {
        let camera = Pose::from_translation(Vec3::ZERO);
        let planes = vec![floor_at(1, 0.0)];
        let sorted = sort_planes(&planes, &camera);
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].distance, 0.0);
    }
}
