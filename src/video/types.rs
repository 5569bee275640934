use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Tolerance when comparing scene boundaries reported by the analyzer
pub const SCENE_EPSILON: f64 = 1e-6;

/// Content classification of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Action,
    Landscape,
    People,
    Closeup,
    Crowd,
    Text,
    Abstract,
    #[serde(other)]
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Landscape => "landscape",
            Self::People => "people",
            Self::Closeup => "closeup",
            Self::Crowd => "crowd",
            Self::Text => "text",
            Self::Abstract => "abstract",
            Self::Unknown => "unknown",
        }
    }
}

/// A detected scene inside a source clip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Start in source seconds
    pub start: f64,

    /// End in source seconds
    pub end: f64,

    /// Amount of motion (0.0-1.0)
    #[serde(alias = "motion_intensity")]
    pub motion_intensity: f64,

    /// What the scene shows
    #[serde(alias = "content_type", default = "unknown_content")]
    pub content_type: ContentType,

    /// Classifier confidence (0.0-1.0)
    #[serde(default)]
    pub confidence: f64,
}

fn unknown_content() -> ContentType {
    ContentType::Unknown
}

impl Scene {
    /// Scene length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Scene analysis of one source video, as produced by the external video
/// analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnalysis {
    /// Identifier referenced by `MatchedClip::source_id`
    #[serde(alias = "clip_id")]
    pub clip_id: String,

    /// Source length in seconds
    pub duration: f64,

    /// Media location, written into XML exports when present
    #[serde(default)]
    pub path: Option<String>,

    /// Detected scenes, in time order
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl VideoAnalysis {
    /// Scenes to edit with; a clip without scene detection is one scene
    pub fn effective_scenes(&self) -> Vec<Scene> {
        if self.scenes.is_empty() {
            vec![Scene {
                start: 0.0,
                end: self.duration,
                motion_intensity: 0.5,
                content_type: ContentType::Unknown,
                confidence: 0.0,
            }]
        } else {
            self.scenes.clone()
        }
    }

    /// Seconds of distinct material across all scenes
    pub fn unique_duration(&self) -> f64 {
        self.effective_scenes().iter().map(Scene::duration).sum()
    }

    /// Check the analysis is usable for edit generation
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.clip_id.trim().is_empty() {
            return Err(AnalysisError::InvalidVideo {
                clip_id: self.clip_id.clone(),
                reason: "clip id is empty".to_string(),
            });
        }

        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(AnalysisError::InvalidVideo {
                clip_id: self.clip_id.clone(),
                reason: format!("duration {} must be positive", self.duration),
            });
        }

        let scene_error = |index: usize, reason: String| AnalysisError::InvalidScene {
            clip_id: self.clip_id.clone(),
            index,
            reason,
        };

        let mut previous_end = 0.0;
        for (index, scene) in self.scenes.iter().enumerate() {
            if !scene.start.is_finite() || !scene.end.is_finite() || scene.start < 0.0 {
                return Err(scene_error(index, "bounds must be finite and non-negative".to_string()));
            }
            if scene.end <= scene.start {
                return Err(scene_error(
                    index,
                    format!("end {:.3}s is not after start {:.3}s", scene.end, scene.start),
                ));
            }
            if scene.end > self.duration + SCENE_EPSILON {
                return Err(scene_error(
                    index,
                    format!("ends at {:.3}s past clip end {:.3}s", scene.end, self.duration),
                ));
            }
            if scene.start < previous_end - SCENE_EPSILON {
                return Err(scene_error(index, "overlaps the previous scene".to_string()));
            }
            if !(0.0..=1.0).contains(&scene.motion_intensity) || !(0.0..=1.0).contains(&scene.confidence) {
                return Err(scene_error(
                    index,
                    "motion intensity and confidence must lie in 0..1".to_string(),
                ));
            }
            previous_end = scene.end;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(start: f64, end: f64) -> Scene {
        Scene {
            start,
            end,
            motion_intensity: 0.5,
            content_type: ContentType::Landscape,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_sceneless_clip_is_one_scene() {
        let video = VideoAnalysis {
            clip_id: "a".to_string(),
            duration: 8.0,
            path: None,
            scenes: vec![],
        };
        let scenes = video.effective_scenes();
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].end, 8.0);
        assert_eq!(video.unique_duration(), 8.0);
    }

    #[test]
    fn test_overlapping_scenes_rejected() {
        let video = VideoAnalysis {
            clip_id: "a".to_string(),
            duration: 10.0,
            path: None,
            scenes: vec![scene(0.0, 5.0), scene(4.0, 8.0)],
        };
        assert!(matches!(
            video.validate(),
            Err(AnalysisError::InvalidScene { index: 1, .. })
        ));
    }

    #[test]
    fn test_scene_past_clip_end_rejected() {
        let video = VideoAnalysis {
            clip_id: "a".to_string(),
            duration: 10.0,
            path: None,
            scenes: vec![scene(0.0, 12.0)],
        };
        assert!(video.validate().is_err());
    }

    #[test]
    fn test_unknown_content_type_deserializes() {
        let json = r#"{"clipId": "b", "duration": 4.0, "scenes": [
            {"start": 0.0, "end": 4.0, "motionIntensity": 0.3, "contentType": "underwater", "confidence": 0.5}
        ]}"#;
        let video: VideoAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(video.scenes[0].content_type, ContentType::Unknown);
        assert!(video.validate().is_ok());
    }
}
