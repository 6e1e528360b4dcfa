//! Session-level tracking state shown to the user alongside the planes.

use crate::plane::{TrackedPlane, TrackingState};
use serde::{Deserialize, Serialize};

/// Why the camera lost tracking, as reported by the tracking subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingFailureReason {
    #[default]
    None,
    BadState,
    InsufficientLight,
    ExcessiveMotion,
    InsufficientFeatures,
    CameraUnavailable,
}

impl TrackingFailureReason {
    pub fn message(self) -> &'static str {
        match self {
            TrackingFailureReason::None => "",
            TrackingFailureReason::BadState => "Tracking lost due to bad internal state",
            TrackingFailureReason::InsufficientLight => "Too dark. Try moving to a well-lit area",
            TrackingFailureReason::ExcessiveMotion => "Moving too fast. Slow down",
            TrackingFailureReason::InsufficientFeatures => {
                "Can't find anything. Aim device at a surface with more texture or color"
            }
            TrackingFailureReason::CameraUnavailable => {
                "Another app is using the camera. Tap on this app or try closing the other one"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ArState {
    SearchingPlane,
    TrackingPlaneSuccess,
    TrackingFailure { reason: TrackingFailureReason },
}

impl ArState {
    /// Camera failure wins; otherwise success as soon as one plane is drawable.
    pub fn evaluate<'a, I>(
        camera_state: TrackingState,
        failure_reason: TrackingFailureReason,
        planes: I,
    ) -> Self
    where
        I: IntoIterator<Item = &'a TrackedPlane>,
    {
        if camera_state != TrackingState::Tracking {
            return ArState::TrackingFailure {
                reason: failure_reason,
            };
        }

        if planes.into_iter().any(TrackedPlane::is_drawable) {
            ArState::TrackingPlaneSuccess
        } else {
            ArState::SearchingPlane
        }
    }
}

impl std::fmt::Display for ArState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArState::SearchingPlane => f.write_str("Searching for surfaces..."),
            ArState::TrackingPlaneSuccess => f.write_str("Surface detected"),
            // No reason, no message.
            ArState::TrackingFailure { reason } => f.write_str(reason.message()),
        }
    }
}

/// Reports an [`ArState`] only when it changes, so a message is not repeated
/// every frame. A failure with a different reason counts as a change.
#[derive(Debug, Clone, Default)]
pub struct ArStateTracker {
    last: Option<ArState>,
}

impl ArStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, state: ArState) -> Option<&ArState> {
        if self.last == Some(state) {
            return None;
        }
        self.last = Some(state);
        self.last.as_ref()
    }

    pub fn current(&self) -> Option<&ArState> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::PlaneId;
    use crate::pose::Pose;

    fn plane(state: TrackingState) -> TrackedPlane {
        TrackedPlane {
            id: PlaneId(1),
            center_pose: Pose::identity(),
            extent_x: 1.0,
            extent_z: 1.0,
            polygon: None,
            tracking_state: state,
            subsumed_by: None,
        }
    }

    #[test]
    fn test_evaluate() {
        let none = TrackingFailureReason::None;
        assert_eq!(
            ArState::evaluate(TrackingState::Tracking, none, &Vec::<TrackedPlane>::new()),
            ArState::SearchingPlane
        );
        assert_eq!(
            ArState::evaluate(TrackingState::Tracking, none, &[plane(TrackingState::Paused)]),
            ArState::SearchingPlane
        );
        assert_eq!(
            ArState::evaluate(TrackingState::Tracking, none, &[plane(TrackingState::Tracking)]),
            ArState::TrackingPlaneSuccess
        );
        assert_eq!(
            ArState::evaluate(
                TrackingState::Paused,
                TrackingFailureReason::ExcessiveMotion,
                &[plane(TrackingState::Tracking)]
            ),
            ArState::TrackingFailure {
                reason: TrackingFailureReason::ExcessiveMotion
            }
        );
    }

    #[test]
    fn test_tracker_reports_changes_only() {
        let mut tracker = ArStateTracker::new();
        let failure = |reason| ArState::TrackingFailure { reason };

        assert_eq!(tracker.update(ArState::SearchingPlane), Some(&ArState::SearchingPlane));
        assert_eq!(tracker.update(ArState::SearchingPlane), None);

        let light = failure(TrackingFailureReason::InsufficientLight);
        assert_eq!(tracker.update(light), Some(&light));
        assert_eq!(tracker.update(light), None);

        let motion = failure(TrackingFailureReason::ExcessiveMotion);
        assert_eq!(tracker.update(motion), Some(&motion));
        assert_eq!(tracker.current(), Some(&motion));
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&ArState::TrackingFailure {
            reason: TrackingFailureReason::CameraUnavailable,
        })
        .unwrap();
        assert_eq!(json, r#"{"state":"tracking_failure","reason":"camera_unavailable"}"#);
        assert!(ArState::SearchingPlane.to_string().starts_with("Searching"));
    }

    #[test]
    fn test_failure_message() {
        let unknown = ArState::TrackingFailure {
            reason: TrackingFailureReason::None,
        };
        assert_eq!(unknown.to_string(), "");

        let dark = ArState::TrackingFailure {
            reason: TrackingFailureReason::InsufficientLight,
        };
        assert_eq!(dark.to_string(), TrackingFailureReason::InsufficientLight.message());
    }
}
