use crate::{
    styles::traits::{favoured, StyleMetadata},
    styles::{EditStyle, StyleKind},
    video::ContentType,
};

/// Calm editing: long holds, dissolves between unrelated shots
pub struct SmoothStyle;

impl SmoothStyle {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SmoothStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl EditStyle for SmoothStyle {
    fn name(&self) -> &str {
        "smooth"
    }

    fn description(&self) -> &str {
        "Dissolves on soft beats, favouring landscapes and portraits"
    }

    fn kind(&self) -> StyleKind {
        StyleKind::Smooth
    }

    fn content_affinity(&self, content: ContentType) -> f64 {
        match content {
            ContentType::Landscape => 1.0,
            ContentType::People | ContentType::Closeup => 0.7,
            ContentType::Abstract => 0.6,
            ContentType::Unknown => 0.5,
            ContentType::Crowd | ContentType::Text => 0.4,
            ContentType::Action => 0.2,
        }
    }

    fn metadata(&self) -> StyleMetadata {
        StyleMetadata {
            soft_transitions: true,
            favoured_content: favoured(self),
        }
    }
}
