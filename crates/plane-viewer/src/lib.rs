// src/lib.rs
//! Headless viewer for recorded AR plane sessions.
//!
//! Replays JSON scenes (camera poses + tracked planes per frame) through
//! `plane_mesh`, reports the per-frame draw list and, on request, renders
//! the planes offscreen with the alpha-mask occlusion blend.

pub mod app;
pub mod camera;
pub mod config;
pub mod image;
pub mod renderer;
pub mod report;
pub mod scene;
