use crate::{
    styles::traits::{favoured, StyleMetadata},
    styles::{EditStyle, StyleKind},
    video::ContentType,
};

/// High-energy cutting: hard cuts, motion-heavy footage
pub struct DynamicStyle;

impl DynamicStyle {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DynamicStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl EditStyle for DynamicStyle {
    fn name(&self) -> &str {
        "dynamic"
    }

    fn description(&self) -> &str {
        "Hard cuts on the beat with action and crowd footage up front"
    }

    fn kind(&self) -> StyleKind {
        StyleKind::Dynamic
    }

    fn content_affinity(&self, content: ContentType) -> f64 {
        match content {
            ContentType::Action => 1.0,
            ContentType::Crowd => 0.8,
            ContentType::Abstract => 0.7,
            ContentType::People | ContentType::Closeup => 0.6,
            ContentType::Unknown => 0.5,
            ContentType::Landscape => 0.3,
            ContentType::Text => 0.2,
        }
    }

    fn metadata(&self) -> StyleMetadata {
        StyleMetadata {
            soft_transitions: false,
            favoured_content: favoured(self),
        }
    }
}
