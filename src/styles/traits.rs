use serde::{Deserialize, Serialize};

use crate::video::ContentType;

/// Broad editing behaviour a style belongs to.
///
/// The transition selector keys its rule table on this, so custom styles pick
/// the closest family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    /// Fast cutting on the beat, favours motion
    Dynamic,

    /// Long holds, dissolves between unrelated shots
    Smooth,

    /// Alternates dissolves and wipes
    Mixed,

    /// Story-driven, favours wide and close framing
    Cinematic,
}

/// Core trait that all editing styles must implement
pub trait EditStyle: Send + Sync {
    /// Returns the unique name of this style
    fn name(&self) -> &str;

    /// Returns a human-readable description of this style
    fn description(&self) -> &str;

    /// Which family of transition rules applies
    fn kind(&self) -> StyleKind;

    /// How well a content type suits this style (0.0-1.0)
    fn content_affinity(&self, content: ContentType) -> f64;

    /// Content-type match term of the candidate score.
    ///
    /// Low classifier confidence pulls the affinity toward a neutral 0.5.
    fn content_match(&self, content: ContentType, confidence: f64) -> f64 {
        let confidence = confidence.clamp(0.0, 1.0);
        0.5 + (self.content_affinity(content) - 0.5) * confidence
    }

    /// Get style-specific metadata
    fn metadata(&self) -> StyleMetadata {
        StyleMetadata::default()
    }
}

/// Metadata about a style, shown when listing styles
#[derive(Debug, Clone, Default)]
pub struct StyleMetadata {
    /// Whether the style produces dissolves or wipes at all
    pub soft_transitions: bool,

    /// Content types the style ranks highest
    pub favoured_content: Vec<ContentType>,
}

/// Content types ranked by affinity, best first
pub(crate) fn favoured(style: &dyn EditStyle) -> Vec<ContentType> {
    const ALL: [ContentType; 8] = [
        ContentType::Action,
        ContentType::Landscape,
        ContentType::People,
        ContentType::Closeup,
        ContentType::Crowd,
        ContentType::Text,
        ContentType::Abstract,
        ContentType::Unknown,
    ];

    let best = ALL
        .iter()
        .map(|&c| style.content_affinity(c))
        .fold(0.0, f64::max);

    ALL.into_iter()
        .filter(|&c| style.content_affinity(c) >= best - 1e-9)
        .collect()
}
