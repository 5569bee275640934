//! # Timeline Model
//!
//! The edit decision list produced by the engine, the validator that guards
//! its structural invariants, and the edit operations and history used to
//! replace it after generation.
//!
//! An [`EditDecisionList`] is never mutated in place. Every edit builds a new
//! list and runs it through [`TimelineValidator`] before handing it back.

pub mod edit;
pub mod history;
pub mod types;
pub mod validator;

pub use history::EditHistory;
pub use types::{
    EditDecisionList, EdlParts, MatchedClip, Marker, MarkerType, SourceMedia, TrackType, Transition,
    TransitionSpec, TransitionType, TIME_EPSILON,
};
pub use validator::TimelineValidator;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn clip(id: &str, source: &str, timeline: (f64, f64), source_in: f64) -> MatchedClip {
        MatchedClip {
            id: id.to_string(),
            source_id: source.to_string(),
            track_type: TrackType::Video,
            timeline_in: timeline.0,
            timeline_out: timeline.1,
            source_in,
            source_out: source_in + (timeline.1 - timeline.0),
            speed: 1.0,
            enabled: true,
        }
    }

    fn marker(id: &str, kind: MarkerType, position: f64) -> Marker {
        Marker {
            id: id.to_string(),
            kind,
            position,
            label: format!("Cut {:.2}s", position),
            color: None,
        }
    }

    /// Three 2s clips at 30fps from sources "a", "b" and "c": a 0.5s
    /// dissolve into the second, a hard cut into the third
    pub(crate) fn three_clip_parts() -> EdlParts {
        EdlParts {
            project_name: "Fixture".to_string(),
            frame_rate: 30.0,
            total_duration: 6.0,
            sources: ["a", "b", "c"]
                .iter()
                .map(|id| SourceMedia {
                    id: id.to_string(),
                    duration: 10.0,
                    path: Some(format!("/media/{}.mp4", id)),
                })
                .collect(),
            clips: vec![
                clip("clip-001", "a", (0.0, 2.0), 1.0),
                clip("clip-002", "b", (2.0, 4.0), 2.0),
                clip("clip-003", "c", (4.0, 6.0), 3.0),
            ],
            transitions: vec![
                Transition {
                    id: "tr-001".to_string(),
                    kind: TransitionType::Dissolve,
                    duration: 0.5,
                    outgoing_clip_id: "clip-001".to_string(),
                    incoming_clip_id: "clip-002".to_string(),
                    center_point: 2.0,
                },
                Transition {
                    id: "tr-002".to_string(),
                    kind: TransitionType::Cut,
                    duration: 0.0,
                    outgoing_clip_id: "clip-002".to_string(),
                    incoming_clip_id: "clip-003".to_string(),
                    center_point: 4.0,
                },
            ],
            cut_points: vec![
                marker("marker-001", MarkerType::In, 0.0),
                marker("marker-002", MarkerType::Marker, 2.0),
                marker("marker-003", MarkerType::Marker, 4.0),
                marker("marker-004", MarkerType::Out, 6.0),
            ],
        }
    }

    pub(crate) fn three_clip_edl() -> EditDecisionList {
        EditDecisionList::from_parts(three_clip_parts())
    }
}
