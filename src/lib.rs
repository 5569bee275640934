//! # beatcut
//!
//! Cut your footage to the music and hand the result to your editor.
//!
//! This library turns beat/energy analysis of a soundtrack and scene analysis
//! of several video clips into a frame-accurate, deterministic edit decision
//! list that Premiere Pro, Final Cut Pro X or any CMX3600 reader can import.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beatcut::{
//!     audio::AudioAnalysisLoader,
//!     config::Config,
//!     export::{EdlSerializer, ExportFormat},
//!     video::VideoAnalysisLoader,
//!     EditDecisionEngine,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let audio = AudioAnalysisLoader::load("song.analysis.json").await?;
//! let videos = vec![
//!     VideoAnalysisLoader::load("intro.analysis.json").await?,
//!     VideoAnalysisLoader::load("crowd.analysis.json").await?,
//! ];
//!
//! let engine = EditDecisionEngine::from_config(config.clone())?;
//! let generated = engine.generate(&audio, &videos)?;
//! for warning in &generated.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//!
//! let xml = EdlSerializer::new(config.export).export(&generated.edl, ExportFormat::Fcpx)?;
//! std::fs::write("edit.fcpxml", xml)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`audio`] / [`video`] - Analysis input models and JSON loaders
//! - [`composition`] - The edit decision engine and the analysis join barrier
//! - [`timeline`] - Edit decision list, validator, edit operations and undo history
//! - [`export`] - Premiere XML, FCPX XML and CMX3600 writers
//! - [`styles`] - Editing styles and their registry
//! - [`config`] - Configuration management
//!
//! ## Creating Custom Styles
//!
//! Implement [`EditStyle`](styles::EditStyle) and register a factory:
//!
//! ```rust
//! use beatcut::styles::{EditStyle, StyleKind, StyleRegistry};
//! use beatcut::video::ContentType;
//!
//! struct Documentary;
//!
//! impl EditStyle for Documentary {
//!     fn name(&self) -> &str {
//!         "documentary"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Holds on people and text"
//!     }
//!
//!     fn kind(&self) -> StyleKind {
//!         StyleKind::Cinematic
//!     }
//!
//!     fn content_affinity(&self, content: ContentType) -> f64 {
//!         match content {
//!             ContentType::People | ContentType::Text => 1.0,
//!             _ => 0.4,
//!         }
//!     }
//! }
//!
//! let mut registry = StyleRegistry::new();
//! registry.register("documentary".to_string(), || Box::new(Documentary));
//! assert!(registry.has_style("documentary"));
//! ```

pub mod audio;
pub mod composition;
pub mod config;
pub mod error;
pub mod export;
pub mod styles;
pub mod timecode;
pub mod timeline;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::{EditDecisionEngine, GeneratedEdit},
    config::Config,
    error::{EditError, Result},
    export::{EdlSerializer, ExportFormat},
    styles::{EditStyle, StyleRegistry},
    timeline::{EditDecisionList, TimelineValidator},
};
