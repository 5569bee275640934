//! # Video Analysis Input
//!
//! Scene, motion and content analysis of each source clip, produced by an
//! external analyzer (one document per clip).

pub mod loader;
pub mod types;

pub use loader::{validate_video_set, VideoAnalysisLoader};
pub use types::{ContentType, Scene, VideoAnalysis, SCENE_EPSILON};
