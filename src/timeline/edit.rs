//! Edit operations on a generated timeline.
//!
//! Each operation copies the list, applies the change and validates the
//! result. The receiver is left untouched whether or not the edit succeeds.

use tracing::debug;

use crate::error::{EditError, Result};
use crate::timeline::types::{EditDecisionList, MarkerType, TrackType, TransitionSpec, TIME_EPSILON};
use crate::timeline::validator::TimelineValidator;

impl EditDecisionList {
    /// Move a clip's timeline out point, keeping its in point and speed.
    ///
    /// The new out point is floored to the frame grid. A transition leaving
    /// the clip turns into a cut once the trim opens a gap, and trimming the
    /// last clip shortens the timeline.
    pub fn trim_out(&self, clip_id: &str, new_out: f64) -> Result<Self> {
        let mut parts = self.to_parts();
        let rate = self.rate();
        let new_out = rate.snap_down(new_out);

        let furthest = parts
            .clips
            .iter()
            .map(|c| c.timeline_out)
            .fold(f64::NEG_INFINITY, f64::max);

        let clip = parts
            .clips
            .iter_mut()
            .find(|c| c.id == clip_id)
            .ok_or_else(|| EditError::UnknownItem { id: clip_id.to_string() })?;

        let reached_end = clip.timeline_out >= furthest - TIME_EPSILON;
        clip.timeline_out = new_out;
        clip.source_out = clip.source_in + (new_out - clip.timeline_in) * clip.speed;
        let trimmed = clip.clone();

        for transition in parts.transitions.iter_mut().filter(|t| t.outgoing_clip_id == clip_id) {
            let opens_gap = parts
                .clips
                .iter()
                .find(|c| c.id == transition.incoming_clip_id)
                .map(|incoming| incoming.timeline_in > trimmed.timeline_out + TIME_EPSILON)
                .unwrap_or(false);
            if opens_gap {
                let cut = TransitionSpec::cut();
                transition.kind = cut.kind;
                transition.duration = cut.duration;
            }
        }

        if reached_end {
            let total = parts
                .clips
                .iter()
                .map(|c| c.timeline_out)
                .fold(0.0, f64::max);
            parts.total_duration = total;
            parts
                .cut_points
                .retain(|m| m.kind == MarkerType::Out || m.position <= total + TIME_EPSILON);
            for marker in parts.cut_points.iter_mut().filter(|m| m.kind == MarkerType::Out) {
                marker.position = total;
            }
        }

        debug!("Trimmed {} to end at {:.3}s", clip_id, new_out);
        finish(Self::from_parts(parts))
    }

    /// Move the video clip at position `from` to position `to`.
    ///
    /// Clips keep their lengths and the gap pattern of the track is kept by
    /// position. The transition at each boundary keeps its kind and is
    /// refitted to the handles of the clips now meeting there.
    pub fn reorder(&self, from: usize, to: usize) -> Result<Self> {
        let mut parts = self.to_parts();
        let rate = self.rate();

        let (mut video, audio): (Vec<_>, Vec<_>) = parts
            .clips
            .drain(..)
            .partition(|c| c.track_type == TrackType::Video);

        for index in [from, to] {
            if index >= video.len() {
                return Err(EditError::UnknownItem {
                    id: format!("video clip #{}", index),
                });
            }
        }

        // Gap before each position, and the transition spec of each boundary
        let mut gaps = Vec::with_capacity(video.len());
        let mut boundary_specs = Vec::with_capacity(video.len());
        let mut previous_out = 0.0;
        for (index, clip) in video.iter().enumerate() {
            gaps.push((clip.timeline_in - previous_out).max(0.0));
            previous_out = clip.timeline_out;

            let spec = if index == 0 {
                None
            } else {
                self.transition_between(&video[index - 1].id, &clip.id)
                    .map(|t| (t.id.clone(), t.spec()))
            };
            boundary_specs.push(spec);
        }

        let moved = video.remove(from);
        video.insert(to, moved);

        let mut cursor = 0.0;
        for (clip, gap) in video.iter_mut().zip(&gaps) {
            let length = clip.timeline_duration();
            clip.timeline_in = cursor + gap;
            clip.timeline_out = clip.timeline_in + length;
            cursor = clip.timeline_out;
        }

        parts.transitions.retain(|t| {
            !boundary_specs
                .iter()
                .flatten()
                .any(|(id, _)| *id == t.id)
        });
        for (index, spec) in boundary_specs.iter().enumerate() {
            let Some((id, spec)) = spec else { continue };
            let outgoing = &video[index - 1];
            let incoming = &video[index];

            let fitted = if incoming.timeline_in > outgoing.timeline_out + TIME_EPSILON {
                TransitionSpec::cut()
            } else {
                let source_length = self
                    .source(&outgoing.source_id)
                    .map(|s| s.duration)
                    .unwrap_or(0.0);
                spec.fitted(outgoing, incoming, source_length, rate)
            };

            parts.transitions.push(crate::timeline::types::Transition {
                id: id.clone(),
                kind: fitted.kind,
                duration: fitted.duration,
                outgoing_clip_id: outgoing.id.clone(),
                incoming_clip_id: incoming.id.clone(),
                center_point: incoming.timeline_in,
            });
        }

        parts.clips = video;
        parts.clips.extend(audio);
        parts
            .clips
            .sort_by(|a, b| a.timeline_in.total_cmp(&b.timeline_in));

        debug!("Moved video clip #{} to #{}", from, to);
        finish(Self::from_parts(parts))
    }

    /// Replace a transition's kind and length.
    ///
    /// The new kind and length are taken as is. A transition longer than the
    /// available handles is rejected by validation rather than shortened.
    pub fn retransition(&self, transition_id: &str, spec: TransitionSpec) -> Result<Self> {
        let mut parts = self.to_parts();

        let transition = parts
            .transitions
            .iter_mut()
            .find(|t| t.id == transition_id)
            .ok_or_else(|| EditError::UnknownItem {
                id: transition_id.to_string(),
            })?;

        transition.kind = spec.kind;
        transition.duration = spec.duration;

        debug!("Set {} to {:?} ({:.3}s)", transition_id, spec.kind, spec.duration);
        finish(Self::from_parts(parts))
    }
}

fn finish(edl: EditDecisionList) -> Result<EditDecisionList> {
    TimelineValidator::validate(&edl)?;
    Ok(edl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvariantKind;
    use crate::timeline::fixtures::three_clip_edl;
    use crate::timeline::types::TransitionType;

    #[test]
    fn test_trim_last_clip_shortens_timeline() {
        let edl = three_clip_edl();
        let trimmed = edl.trim_out("clip-003", 5.5).unwrap();

        assert_eq!(trimmed.total_duration(), 5.5);
        let clip = trimmed.clip("clip-003").unwrap();
        assert_eq!(clip.source_out, 4.5);
        let out = trimmed.cut_points().last().unwrap();
        assert_eq!(out.kind, MarkerType::Out);
        assert_eq!(out.position, 5.5);

        // Original is untouched
        assert_eq!(edl.total_duration(), 6.0);
    }

    #[test]
    fn test_trim_opening_gap_turns_transition_into_cut() {
        let edl = three_clip_edl();
        let trimmed = edl.trim_out("clip-001", 1.5).unwrap();

        let transition = trimmed.transition_between("clip-001", "clip-002").unwrap();
        assert_eq!(transition.kind, TransitionType::Cut);
        assert_eq!(transition.duration, 0.0);
        assert_eq!(trimmed.total_duration(), 6.0);
    }

    #[test]
    fn test_trim_into_next_clip_rejected() {
        let edl = three_clip_edl();
        let err = edl.trim_out("clip-002", 4.5).unwrap_err();
        match err {
            EditError::Timeline(e) => assert_eq!(e.kind, InvariantKind::ClipOverlap),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trim_unknown_clip() {
        let edl = three_clip_edl();
        assert!(matches!(
            edl.trim_out("clip-999", 1.0),
            Err(EditError::UnknownItem { .. })
        ));
    }

    #[test]
    fn test_reorder_relays_clips_and_refits_transitions() {
        let edl = three_clip_edl();
        let reordered = edl.reorder(2, 0).unwrap();

        let order: Vec<&str> = reordered.clips().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, ["clip-003", "clip-001", "clip-002"]);
        assert_eq!(reordered.clips()[0].timeline_in, 0.0);
        assert_eq!(reordered.clips()[2].timeline_out, 6.0);

        // Boundary 1 keeps the dissolve, now from clip-003 into clip-001
        let first = reordered.transition_between("clip-003", "clip-001").unwrap();
        assert_eq!(first.kind, TransitionType::Dissolve);
        assert_eq!(first.center_point, 2.0);
        assert_eq!(first.duration, 0.5);

        let second = reordered.transition_between("clip-001", "clip-002").unwrap();
        assert_eq!(second.kind, TransitionType::Cut);
        assert_eq!(reordered.transitions().len(), 2);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let edl = three_clip_edl();
        assert!(matches!(edl.reorder(0, 3), Err(EditError::UnknownItem { .. })));
    }

    #[test]
    fn test_retransition_validates_handles() {
        let edl = three_clip_edl();

        let edited = edl.retransition("tr-002", TransitionSpec::wipe(1.0)).unwrap();
        assert_eq!(edited.transitions()[1].kind, TransitionType::Wipe);

        // clip-002 only has 2s of head media
        assert!(edl.retransition("tr-001", TransitionSpec::dissolve(2.5)).is_err());
        assert!(matches!(
            edl.retransition("tr-404", TransitionSpec::cut()),
            Err(EditError::UnknownItem { .. })
        ));
    }
}
