use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Main error type for the beatcut library
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Timeline invariant violated: {0}")]
    Timeline(#[from] TimelineInvariantError),

    #[error("{0}")]
    UnsupportedFormat(#[from] UnsupportedFormatError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Style error: {0}")]
    Style(#[from] StyleError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No timeline item with id '{id}'")]
    UnknownItem { id: String },

    #[error("Edit generation cancelled: {reason}")]
    Cancelled { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Missing, malformed or incomplete analysis input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Audio analysis contains no beats")]
    NoBeats,

    #[error("No video analyses were supplied")]
    NoVideos,

    #[error("Invalid beat #{index}: {reason}")]
    InvalidBeat { index: usize, reason: String },

    #[error("Invalid energy segment #{index}: {reason}")]
    InvalidEnergySegment { index: usize, reason: String },

    #[error("Invalid audio analysis: {reason}")]
    InvalidAudio { reason: String },

    #[error("Invalid video analysis '{clip_id}': {reason}")]
    InvalidVideo { clip_id: String, reason: String },

    #[error("Invalid scene #{index} in '{clip_id}': {reason}")]
    InvalidScene {
        clip_id: String,
        index: usize,
        reason: String,
    },

    #[error("Duplicate video clip id: {clip_id}")]
    DuplicateClip { clip_id: String },

    #[error("Video analyses contain no usable footage")]
    NoUsableMedia,

    #[error("Analysis set incomplete: {reason}")]
    Incomplete { reason: String },

    #[error("Failed to load analysis from {path}: {reason}")]
    LoadFailed { path: String, reason: String },
}

/// Not enough unique footage to cover the soundtrack.
///
/// Never fatal: the engine reports it next to a truncated edit.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{available:.2}s of unique footage for {required:.2}s of audio")]
pub struct InsufficientMediaError {
    /// Seconds of unique scene material across all videos
    pub available: f64,

    /// Seconds of audio that had to be covered
    pub required: f64,
}

/// Which structural rule an edit decision list broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantKind {
    InvalidHeader,
    ClipOrder,
    ClipSpan,
    DuplicateClipId,
    ClipOverlap,
    DanglingTransition,
    TransitionGeometry,
    UnknownSource,
    SourceRange,
    MarkerOutOfRange,
    DurationMismatch,
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidHeader => "invalid_header",
            Self::ClipOrder => "clip_order",
            Self::ClipSpan => "clip_span",
            Self::DuplicateClipId => "duplicate_clip_id",
            Self::ClipOverlap => "clip_overlap",
            Self::DanglingTransition => "dangling_transition",
            Self::TransitionGeometry => "transition_geometry",
            Self::UnknownSource => "unknown_source",
            Self::SourceRange => "source_range",
            Self::MarkerOutOfRange => "marker_out_of_range",
            Self::DurationMismatch => "duration_mismatch",
        };
        f.write_str(name)
    }
}

/// First invariant violation found by the timeline validator
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {detail}")]
pub struct TimelineInvariantError {
    pub kind: InvariantKind,
    pub detail: String,
}

impl TimelineInvariantError {
    pub fn new<S: Into<String>>(kind: InvariantKind, detail: S) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Requested export format is not one we can write
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unsupported export format: {format} (expected premiere, fcpx or cmx3600)")]
pub struct UnsupportedFormatError {
    pub format: String,
}

/// Export-specific errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("XML writing failed: {reason}")]
    XmlWrite { reason: String },

    #[error("Could not parse {format} document: {reason}")]
    ParseFailed { format: String, reason: String },

    #[error("JSON serialization failed: {reason}")]
    Json { reason: String },

    #[error("Invalid export parameters: {details}")]
    InvalidParameters { details: String },
}

/// Style-specific errors
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Style not found: {name}")]
    NotFound { name: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using EditError
pub type Result<T> = std::result::Result<T, EditError>;

impl EditError {
    /// Check if this error is recoverable (the caller may retry or carry on)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Files might appear on retry
            Self::Io(_) => true,
            Self::Analysis(AnalysisError::LoadFailed { .. }) => true,
            Self::Analysis(AnalysisError::Incomplete { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Analysis(AnalysisError::NoVideos) => {
                "Add at least one analyzed video clip before generating an edit.".to_string()
            }
            Self::Analysis(AnalysisError::NoBeats) => {
                "The audio analysis found no beats. Try a different track or re-run the analysis."
                    .to_string()
            }
            Self::Analysis(AnalysisError::LoadFailed { path, .. }) => {
                format!("Could not load analysis file '{}'. Please check the file exists and is valid JSON.", path)
            }
            Self::UnsupportedFormat(UnsupportedFormatError { format }) => {
                format!("Format '{}' is not supported. Available formats: premiere, fcpx, cmx3600", format)
            }
            Self::Style(StyleError::NotFound { name }) => {
                format!("Style '{}' not found. Available styles: dynamic, smooth, mixed, cinematic", name)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
