use crate::{
    styles::traits::{favoured, StyleMetadata},
    styles::{EditStyle, StyleKind},
    video::ContentType,
};

/// Story-first editing built on wide shots and close-ups
pub struct CinematicStyle;

impl CinematicStyle {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CinematicStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl EditStyle for CinematicStyle {
    fn name(&self) -> &str {
        "cinematic"
    }

    fn description(&self) -> &str {
        "Straight cuts between establishing shots, close-ups and people"
    }

    fn kind(&self) -> StyleKind {
        StyleKind::Cinematic
    }

    fn content_affinity(&self, content: ContentType) -> f64 {
        match content {
            ContentType::Landscape | ContentType::Closeup => 0.9,
            ContentType::People => 0.8,
            ContentType::Action | ContentType::Crowd | ContentType::Abstract | ContentType::Unknown => 0.5,
            ContentType::Text => 0.3,
        }
    }

    fn metadata(&self) -> StyleMetadata {
        StyleMetadata {
            soft_transitions: false,
            favoured_content: favoured(self),
        }
    }
}
