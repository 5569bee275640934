use crate::{
    styles::traits::{favoured, StyleMetadata},
    styles::{EditStyle, StyleKind},
    video::ContentType,
};

/// Balanced editing that alternates dissolves and wipes on soft beats
pub struct MixedStyle;

impl MixedStyle {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MixedStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl EditStyle for MixedStyle {
    fn name(&self) -> &str {
        "mixed"
    }

    fn description(&self) -> &str {
        "Alternating dissolves and wipes with no strong content bias"
    }

    fn kind(&self) -> StyleKind {
        StyleKind::Mixed
    }

    fn content_affinity(&self, content: ContentType) -> f64 {
        match content {
            ContentType::Action | ContentType::Landscape | ContentType::People => 0.7,
            ContentType::Crowd | ContentType::Closeup | ContentType::Abstract => 0.6,
            ContentType::Unknown => 0.5,
            ContentType::Text => 0.4,
        }
    }

    fn metadata(&self) -> StyleMetadata {
        StyleMetadata {
            soft_transitions: true,
            favoured_content: favoured(self),
        }
    }
}
