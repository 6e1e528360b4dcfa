//! Recorded AR sessions: per-frame camera pose, tracking status and planes.

use anyhow::{Context, Result};
use plane_mesh::{PointCloud, Pose, TrackedPlane, TrackingFailureReason, TrackingState};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Camera projection, OpenGL clip conventions.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    Perspective {
        fov_y_deg: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    /// Column-major 4x4, as returned by the AR camera.
    Matrix { cols: [f32; 16] },
}

impl Default for Projection {
    fn default() -> Self {
        // Near/far match the on-device plane pass (0.1 m .. 100 m).
        Projection::Perspective {
            fov_y_deg: 60.0,
            aspect: 4.0 / 3.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    /// Display-oriented camera pose.
    pub camera: Pose,
    #[serde(default = "tracking")]
    pub camera_tracking: TrackingState,
    #[serde(default)]
    pub failure_reason: TrackingFailureReason,
    #[serde(default)]
    pub planes: Vec<TrackedPlane>,
    /// Absent when the recording has no feature points for this frame.
    #[serde(default)]
    pub point_cloud: Option<PointCloud>,
}

fn tracking() -> TrackingState {
    TrackingState::Tracking
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub projection: Projection,
    pub frames: Vec<Frame>,
}

pub fn parse_scene(json: &str) -> Result<Scene> {
    Ok(serde_json::from_str(json)?)
}

/// Loads a scene; an unnamed scene takes its file stem as name.
pub fn load_scene(path: &Path) -> Result<Scene> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scene {}", path.display()))?;
    let mut scene =
        parse_scene(&text).with_context(|| format!("parsing scene {}", path.display()))?;

    if scene.name.is_empty() {
        scene.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("scene")
            .to_owned();
    }

    Ok(scene)
}

/// `root` itself if it is a file, otherwise every `*.json` below it, sorted.
pub fn collect_scene_paths(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut paths: Vec<_> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use plane_mesh::PlaneId;

    const SCENE: &str = r#"{
        "name": "desk",
        "projection": { "kind": "perspective", "fov_y_deg": 55.0, "aspect": 1.5, "near": 0.1, "far": 50.0 },
        "frames": [
            {
                "camera": { "translation": [0, 1.4, 0], "rotation": [0, 0, 0, 1] },
                "planes": [
                    {
                        "id": 1,
                        "center_pose": { "translation": [0, 0, -1], "rotation": [0, 0, 0, 1] },
                        "extent_x": 2, "extent_z": 2,
                        "polygon": [[-1, -1], [1, -1], [1, 1], [-1, 1]],
                        "tracking_state": "tracking"
                    }
                ],
                "point_cloud": { "timestamp": 1001, "points": [[0, 0, -1, 0.75], [0.5, 0, -1.25, 0.25]] }
            },
            {
                "camera": { "translation": [0, 1.4, 0], "rotation": [0, 0, 0, 1] },
                "camera_tracking": "paused",
                "failure_reason": "insufficient_light"
            }
        ]
    }"#;

    #[test]
    fn test_parse_scene() {
        let scene = parse_scene(SCENE).unwrap();
        assert_eq!(scene.name, "desk");
        assert_eq!(scene.frames.len(), 2);

        let first = &scene.frames[0];
        assert_eq!(first.camera_tracking, TrackingState::Tracking);
        assert_eq!(first.failure_reason, TrackingFailureReason::None);
        assert_eq!(first.planes[0].id, PlaneId(1));
        let cloud = first.point_cloud.as_ref().unwrap();
        assert_eq!(cloud.timestamp, 1001);
        assert_eq!(cloud.points[1], [0.5, 0.0, -1.25, 0.25]);

        let second = &scene.frames[1];
        assert_eq!(second.camera_tracking, TrackingState::Paused);
        assert_eq!(second.failure_reason, TrackingFailureReason::InsufficientLight);
        assert!(second.planes.is_empty());
        assert!(second.point_cloud.is_none());
    }

    #[test]
    fn test_matrix_projection_and_defaults() {
        let scene = parse_scene(
            r#"{ "projection": { "kind": "matrix", "cols": [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1] }, "frames": [] }"#,
        )
        .unwrap();
        assert!(matches!(scene.projection, Projection::Matrix { .. }));
        assert!(scene.name.is_empty());

        let scene = parse_scene(r#"{ "frames": [] }"#).unwrap();
        assert_eq!(scene.projection, Projection::default());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_scene(r#"{ "frames": [ { "planes": [] } ] }"#).is_err());
    }

    #[test]
    fn test_load_and_collect() {
        let dir = std::env::temp_dir().join(format!("plane_viewer_scenes_{}", std::process::id()));
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("b.json"), SCENE).unwrap();
        std::fs::write(dir.join("nested").join("a.json"), r#"{ "frames": [] }"#).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let paths = collect_scene_paths(&dir);
        assert_eq!(paths.len(), 2);
        assert!(paths.windows(2).all(|w| w[0] <= w[1]));

        let unnamed = load_scene(&dir.join("nested").join("a.json")).unwrap();
        assert_eq!(unnamed.name, "a");
        assert_eq!(collect_scene_paths(&dir.join("b.json")), vec![dir.join("b.json")]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
