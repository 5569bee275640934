use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::audio::loader::read_json;
use crate::error::{AnalysisError, Result};
use crate::video::types::VideoAnalysis;

/// Loads per-clip scene analysis documents written by the external analyzer
pub struct VideoAnalysisLoader;

impl VideoAnalysisLoader {
    /// Load and validate a single video analysis JSON file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<VideoAnalysis> {
        let path = path.as_ref();
        let analysis: VideoAnalysis = read_json(path).await?;
        analysis.validate()?;

        debug!(
            "Loaded video analysis '{}' ({:.1}s, {} scenes)",
            analysis.clip_id,
            analysis.duration,
            analysis.scenes.len()
        );
        Ok(analysis)
    }

    /// Parse a video analysis from a JSON string
    pub fn from_json(json: &str) -> Result<VideoAnalysis> {
        let analysis: VideoAnalysis =
            serde_json::from_str(json).map_err(|e| AnalysisError::LoadFailed {
                path: "<inline>".to_string(),
                reason: e.to_string(),
            })?;
        analysis.validate()?;
        Ok(analysis)
    }
}

/// Validate a full set of video analyses: non-empty, each valid, ids unique
pub fn validate_video_set(videos: &[VideoAnalysis]) -> std::result::Result<(), AnalysisError> {
    if videos.is_empty() {
        return Err(AnalysisError::NoVideos);
    }

    let mut seen = BTreeSet::new();
    for video in videos {
        video.validate()?;
        if !seen.insert(video.clip_id.as_str()) {
            return Err(AnalysisError::DuplicateClip {
                clip_id: video.clip_id.clone(),
            });
        }
    }

    Ok(())
}
