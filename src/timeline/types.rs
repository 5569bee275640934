use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::timecode::FrameRate;
use crate::timeline::validator::TimelineValidator;

/// Tolerance for comparing two times that should be equal
pub const TIME_EPSILON: f64 = 1e-6;

/// Which track a clip lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Video,
    Audio,
}

/// A span of source media placed on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedClip {
    pub id: String,

    /// `VideoAnalysis::clip_id` of the footage
    pub source_id: String,

    pub track_type: TrackType,

    /// Timeline position in seconds
    pub timeline_in: f64,
    pub timeline_out: f64,

    /// Source position in seconds
    pub source_in: f64,
    pub source_out: f64,

    /// Playback speed; source length = timeline length * speed
    #[serde(default = "default_speed")]
    pub speed: f64,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_speed() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

impl MatchedClip {
    /// Length on the timeline in seconds
    pub fn timeline_duration(&self) -> f64 {
        self.timeline_out - self.timeline_in
    }

    /// Length of the source span in seconds
    pub fn source_duration(&self) -> f64 {
        self.source_out - self.source_in
    }

    /// Timeline seconds of unused source media after the out point
    pub fn tail_slack(&self, source_length: f64) -> f64 {
        (source_length - self.source_out) / self.speed
    }

    /// Timeline seconds of unused source media before the in point
    pub fn head_slack(&self) -> f64 {
        self.source_in / self.speed
    }
}

/// Kind of transition at a cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    Cut,
    Dissolve,
    Wipe,
    DipToBlack,
}

impl TransitionType {
    pub fn is_cut(&self) -> bool {
        matches!(self, Self::Cut)
    }

    /// Effect name NLEs know this transition by
    pub fn effect_name(&self) -> &'static str {
        match self {
            Self::Cut => "Cut",
            Self::Dissolve => "Cross Dissolve",
            Self::Wipe => "Wipe",
            Self::DipToBlack => "Dip to Color Dissolve",
        }
    }
}

/// A transition kind with its length, before it is attached to two clips
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub kind: TransitionType,

    /// Seconds; always 0 for a cut
    pub duration: f64,
}

impl TransitionSpec {
    pub fn cut() -> Self {
        Self {
            kind: TransitionType::Cut,
            duration: 0.0,
        }
    }

    pub fn dissolve(duration: f64) -> Self {
        Self {
            kind: TransitionType::Dissolve,
            duration,
        }
    }

    pub fn wipe(duration: f64) -> Self {
        Self {
            kind: TransitionType::Wipe,
            duration,
        }
    }

    /// Shrink the transition to what the two clips can support.
    ///
    /// The duration is bounded by the outgoing clip's tail slack, the
    /// incoming clip's head slack and both clip spans, then floored to whole
    /// frames. Anything shorter than a frame degrades to a cut.
    pub fn fitted(
        self,
        outgoing: &MatchedClip,
        incoming: &MatchedClip,
        outgoing_source_length: f64,
        rate: FrameRate,
    ) -> Self {
        if self.kind.is_cut() {
            return Self::cut();
        }

        let limit = self
            .duration
            .min(outgoing.tail_slack(outgoing_source_length))
            .min(incoming.head_slack())
            .min(outgoing.timeline_duration())
            .min(incoming.timeline_duration())
            .max(0.0);

        let duration = rate.snap_down(limit);
        if duration < rate.frame_duration() - TIME_EPSILON {
            Self::cut()
        } else {
            Self {
                kind: self.kind,
                duration,
            }
        }
    }
}

/// A transition between two timeline-adjacent clips, centred on the cut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: TransitionType,

    pub duration: f64,
    pub outgoing_clip_id: String,
    pub incoming_clip_id: String,

    /// Always the incoming clip's timeline in point
    pub center_point: f64,
}

impl Transition {
    pub fn spec(&self) -> TransitionSpec {
        TransitionSpec {
            kind: self.kind,
            duration: self.duration,
        }
    }
}

/// Kind of timeline marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerType {
    In,
    Out,
    Marker,
}

/// A labelled point on the timeline; the engine drops one on every cut point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: MarkerType,

    pub position: f64,
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Source footage referenced by clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMedia {
    /// Matches `MatchedClip::source_id`
    pub id: String,

    /// Length in seconds
    pub duration: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Owned building blocks of an [`EditDecisionList`]
#[derive(Debug, Clone, PartialEq)]
pub struct EdlParts {
    pub project_name: String,
    pub frame_rate: f64,
    pub total_duration: f64,
    pub sources: Vec<SourceMedia>,
    pub clips: Vec<MatchedClip>,
    pub transitions: Vec<Transition>,
    pub cut_points: Vec<Marker>,
}

/// The edit: clips, transitions and cut markers on a timeline.
///
/// Immutable once built. Edits produce a new list (see `timeline::edit`),
/// and a list only becomes current after passing [`TimelineValidator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDecisionList {
    project_name: String,
    frame_rate: f64,
    total_duration: f64,
    sources: Vec<SourceMedia>,
    clips: Vec<MatchedClip>,
    transitions: Vec<Transition>,
    cut_points: Vec<Marker>,
}

impl EditDecisionList {
    /// Assemble a list from its parts; no validation is performed
    pub fn from_parts(parts: EdlParts) -> Self {
        Self {
            project_name: parts.project_name,
            frame_rate: parts.frame_rate,
            total_duration: parts.total_duration,
            sources: parts.sources,
            clips: parts.clips,
            transitions: parts.transitions,
            cut_points: parts.cut_points,
        }
    }

    /// Copy the list back into editable parts
    pub fn to_parts(&self) -> EdlParts {
        EdlParts {
            project_name: self.project_name.clone(),
            frame_rate: self.frame_rate,
            total_duration: self.total_duration,
            sources: self.sources.clone(),
            clips: self.clips.clone(),
            transitions: self.transitions.clone(),
            cut_points: self.cut_points.clone(),
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Frames per second as stored
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Frame rate with frame/timecode helpers
    pub fn rate(&self) -> FrameRate {
        FrameRate::from_fps(self.frame_rate)
    }

    /// Timeline length in seconds
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn sources(&self) -> &[SourceMedia] {
        &self.sources
    }

    pub fn source(&self, id: &str) -> Option<&SourceMedia> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Clips sorted by timeline in point
    pub fn clips(&self) -> &[MatchedClip] {
        &self.clips
    }

    pub fn clip(&self, id: &str) -> Option<&MatchedClip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Clips on one track, in timeline order
    pub fn clips_on(&self, track: TrackType) -> impl Iterator<Item = &MatchedClip> {
        self.clips.iter().filter(move |c| c.track_type == track)
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transition joining two clips, if any
    pub fn transition_between(&self, outgoing_id: &str, incoming_id: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.outgoing_clip_id == outgoing_id && t.incoming_clip_id == incoming_id)
    }

    /// One marker per cut point
    pub fn cut_points(&self) -> &[Marker] {
        &self.cut_points
    }

    /// Serialize to pretty JSON for the preview and export layers
    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ExportError::Json {
            reason: e.to_string(),
        })?;
        Ok(json)
    }

    /// Parse a list from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let edl: Self = serde_json::from_str(json).map_err(|e| ExportError::Json {
            reason: e.to_string(),
        })?;
        TimelineValidator::validate(&edl)?;
        Ok(edl)
    }
}
