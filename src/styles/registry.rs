use std::collections::HashMap;

use crate::error::StyleError;
use crate::styles::{CinematicStyle, DynamicStyle, EditStyle, MixedStyle, SmoothStyle};

/// Registry for managing available editing styles
///
/// The registry provides a central place to discover and instantiate styles.
/// Styles are registered by name and resolved from `StyleConfig::style`.
pub struct StyleRegistry {
    styles: HashMap<String, Box<dyn Fn() -> Box<dyn EditStyle>>>,
}

impl StyleRegistry {
    /// Create a new style registry with all built-in styles
    pub fn new() -> Self {
        let mut registry = Self {
            styles: HashMap::new(),
        };

        registry.register_builtin_styles();
        registry
    }

    fn register_builtin_styles(&mut self) {
        self.styles.insert(
            "dynamic".to_string(),
            Box::new(|| Box::new(DynamicStyle::new())),
        );

        self.styles.insert(
            "smooth".to_string(),
            Box::new(|| Box::new(SmoothStyle::new())),
        );

        self.styles.insert(
            "mixed".to_string(),
            Box::new(|| Box::new(MixedStyle::new())),
        );

        self.styles.insert(
            "cinematic".to_string(),
            Box::new(|| Box::new(CinematicStyle::new())),
        );
    }

    /// Register a custom style
    ///
    /// # Arguments
    ///
    /// * `name` - Unique name for the style
    /// * `factory` - Function that creates new instances of the style
    pub fn register<F>(&mut self, name: String, factory: F)
    where
        F: Fn() -> Box<dyn EditStyle> + 'static,
    {
        self.styles.insert(style_key(&name), Box::new(factory));
    }

    /// Get a style by name (case-insensitive)
    pub fn get_style(&self, name: &str) -> Option<Box<dyn EditStyle>> {
        self.styles
            .get(&style_key(name))
            .map(|factory| factory())
    }

    /// Get a style by name, failing with `StyleError::NotFound`
    pub fn resolve(&self, name: &str) -> Result<Box<dyn EditStyle>, StyleError> {
        self.get_style(name).ok_or_else(|| StyleError::NotFound {
            name: name.to_string(),
        })
    }

    /// Get all available style names, sorted
    pub fn available_styles(&self) -> Vec<String> {
        let mut names: Vec<String> = self.styles.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a style is available (case-insensitive)
    pub fn has_style(&self, name: &str) -> bool {
        self.styles.contains_key(&style_key(name))
    }

    /// Get the number of registered styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Names are matched trimmed and lowercased
fn style_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::StyleKind;
    use crate::video::ContentType;

    #[test]
    fn test_builtin_styles_available() {
        let registry = StyleRegistry::new();

        assert!(registry.has_style("dynamic"));
        assert!(registry.has_style("smooth"));
        assert!(registry.has_style("mixed"));
        assert!(registry.has_style("cinematic"));

        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_get_style() {
        let registry = StyleRegistry::new();

        let smooth = registry.get_style("Smooth");
        assert!(smooth.is_some());
        assert_eq!(smooth.unwrap().kind(), StyleKind::Smooth);

        assert!(registry.get_style("unknown").is_none());
        assert!(matches!(
            registry.resolve("unknown"),
            Err(StyleError::NotFound { .. })
        ));
    }

    #[test]
    fn test_available_styles_sorted() {
        let registry = StyleRegistry::new();
        assert_eq!(
            registry.available_styles(),
            vec!["cinematic", "dynamic", "mixed", "smooth"]
        );
    }

    #[test]
    fn test_custom_style_registration() {
        let mut registry = StyleRegistry::new();

        registry.register("music-video".to_string(), || Box::new(DynamicStyle::new()));

        assert!(registry.has_style("music-video"));
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_custom_style_names_ignore_case() {
        let mut registry = StyleRegistry::new();

        registry.register("MusicVideo".to_string(), || Box::new(DynamicStyle::new()));

        assert!(registry.has_style("MusicVideo"));
        assert!(registry.has_style("musicvideo"));
        assert!(registry.get_style("MusicVideo").is_some());
        assert!(registry.resolve(" musicVIDEO ").is_ok());
        assert!(registry.available_styles().contains(&"musicvideo".to_string()));
    }

    #[test]
    fn test_content_match_respects_confidence() {
        let style = SmoothStyle::new();
        assert_eq!(style.content_match(ContentType::Landscape, 1.0), 1.0);
        assert_eq!(style.content_match(ContentType::Landscape, 0.0), 0.5);
        assert!((style.content_match(ContentType::Action, 0.5) - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_metadata_lists_favoured_content() {
        let metadata = DynamicStyle::new().metadata();
        assert_eq!(metadata.favoured_content, vec![ContentType::Action]);
        assert!(!metadata.soft_transitions);
    }
}
