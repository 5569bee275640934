use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{InvariantKind, TimelineInvariantError};
use crate::timeline::types::{EditDecisionList, MatchedClip, TrackType, TIME_EPSILON};

type Check = std::result::Result<(), TimelineInvariantError>;

/// Structural checker for edit decision lists.
///
/// Checks run in a fixed order and the first violation is returned. The
/// validator never repairs anything.
pub struct TimelineValidator;

impl TimelineValidator {
    /// Validate every structural invariant of an edit decision list
    pub fn validate(edl: &EditDecisionList) -> Check {
        Self::check_header(edl)?;
        Self::check_layout(edl)?;
        Self::check_transitions(edl)?;
        Self::check_source_ranges(edl)?;
        Self::check_markers(edl)?;
        Self::check_duration(edl)?;

        debug!(
            "Timeline valid: {} clips, {} transitions, {} markers",
            edl.clips().len(),
            edl.transitions().len(),
            edl.cut_points().len()
        );
        Ok(())
    }

    fn check_header(edl: &EditDecisionList) -> Check {
        let fps = edl.frame_rate();
        if !fps.is_finite() || fps <= 0.0 {
            return Err(violation(
                InvariantKind::InvalidHeader,
                format!("frame rate {} must be positive", fps),
            ));
        }

        let total = edl.total_duration();
        if !total.is_finite() || total < 0.0 {
            return Err(violation(
                InvariantKind::InvalidHeader,
                format!("total duration {} must be non-negative", total),
            ));
        }

        Ok(())
    }

    /// Ordering, spans, unique ids and the per-track overlap bound
    fn check_layout(edl: &EditDecisionList) -> Check {
        let mut seen = HashSet::new();
        let mut previous_in = f64::NEG_INFINITY;

        for clip in edl.clips() {
            if !seen.insert(clip.id.as_str()) {
                return Err(violation(InvariantKind::DuplicateClipId, clip.id.clone()));
            }

            if !clip.timeline_in.is_finite() || !clip.timeline_out.is_finite() || clip.timeline_in < -TIME_EPSILON {
                return Err(violation(
                    InvariantKind::ClipSpan,
                    format!("{} has timeline bounds {}..{}", clip.id, clip.timeline_in, clip.timeline_out),
                ));
            }

            if clip.timeline_out <= clip.timeline_in {
                return Err(violation(
                    InvariantKind::ClipSpan,
                    format!(
                        "{} ends at {:.6}s, not after its start {:.6}s",
                        clip.id, clip.timeline_out, clip.timeline_in
                    ),
                ));
            }

            if clip.timeline_in < previous_in - TIME_EPSILON {
                return Err(violation(
                    InvariantKind::ClipOrder,
                    format!("{} starts at {:.6}s, before the clip preceding it", clip.id, clip.timeline_in),
                ));
            }
            previous_in = clip.timeline_in;
        }

        for track in [TrackType::Video, TrackType::Audio] {
            // Compare each clip against the furthest-reaching clip before it
            let mut reach: Option<&MatchedClip> = None;
            for clip in edl.clips_on(track) {
                if let Some(previous) = reach {
                    let overlap = previous.timeline_out - clip.timeline_in;
                    if overlap > TIME_EPSILON {
                        let allowed = edl
                            .transition_between(&previous.id, &clip.id)
                            .map(|t| t.duration)
                            .unwrap_or(0.0);
                        if overlap > allowed + TIME_EPSILON {
                            return Err(violation(
                                InvariantKind::ClipOverlap,
                                format!(
                                    "{} and {} overlap by {:.6}s, transition allows {:.6}s",
                                    previous.id, clip.id, overlap, allowed
                                ),
                            ));
                        }
                    }
                    if clip.timeline_out > previous.timeline_out {
                        reach = Some(clip);
                    }
                } else {
                    reach = Some(clip);
                }
            }
        }

        Ok(())
    }

    fn check_transitions(edl: &EditDecisionList) -> Check {
        let clips: HashMap<&str, &MatchedClip> =
            edl.clips().iter().map(|c| (c.id.as_str(), c)).collect();

        for transition in edl.transitions() {
            let outgoing = clips.get(transition.outgoing_clip_id.as_str()).ok_or_else(|| {
                violation(
                    InvariantKind::DanglingTransition,
                    format!("{} references missing clip {}", transition.id, transition.outgoing_clip_id),
                )
            })?;
            let incoming = clips.get(transition.incoming_clip_id.as_str()).ok_or_else(|| {
                violation(
                    InvariantKind::DanglingTransition,
                    format!("{} references missing clip {}", transition.id, transition.incoming_clip_id),
                )
            })?;

            if outgoing.id == incoming.id {
                return Err(violation(
                    InvariantKind::DanglingTransition,
                    format!("{} joins {} to itself", transition.id, outgoing.id),
                ));
            }

            let geometry = |detail: String| violation(InvariantKind::TransitionGeometry, detail);

            if outgoing.track_type != incoming.track_type || incoming.timeline_in <= outgoing.timeline_in {
                return Err(geometry(format!(
                    "{} does not join {} to a later clip on the same track",
                    transition.id, outgoing.id
                )));
            }

            if (transition.center_point - incoming.timeline_in).abs() > TIME_EPSILON {
                return Err(geometry(format!(
                    "{} is centred at {:.6}s, incoming {} starts at {:.6}s",
                    transition.id, transition.center_point, incoming.id, incoming.timeline_in
                )));
            }

            if !transition.duration.is_finite() || transition.duration < 0.0 {
                return Err(geometry(format!("{} has duration {}", transition.id, transition.duration)));
            }

            if transition.kind.is_cut() {
                if transition.duration > TIME_EPSILON {
                    return Err(geometry(format!(
                        "{} is a cut with duration {:.6}s",
                        transition.id, transition.duration
                    )));
                }
                continue;
            }

            let head = incoming.head_slack();
            // An unknown source is reported by the source-range check
            let tail = edl
                .source(&outgoing.source_id)
                .map(|source| outgoing.tail_slack(source.duration))
                .unwrap_or(f64::INFINITY);
            let limit = head.min(tail);

            if transition.duration > limit + TIME_EPSILON {
                return Err(geometry(format!(
                    "{} lasts {:.6}s but only {:.6}s of handle media exists",
                    transition.id, transition.duration, limit
                )));
            }
        }

        Ok(())
    }

    fn check_source_ranges(edl: &EditDecisionList) -> Check {
        for clip in edl.clips() {
            let source = edl.source(&clip.source_id).ok_or_else(|| {
                violation(
                    InvariantKind::UnknownSource,
                    format!("{} references unknown source {}", clip.id, clip.source_id),
                )
            })?;

            let range = |detail: String| violation(InvariantKind::SourceRange, format!("{}: {}", clip.id, detail));

            if !clip.speed.is_finite() || clip.speed <= 0.0 {
                return Err(range(format!("speed {} must be positive", clip.speed)));
            }

            if clip.source_in < -TIME_EPSILON
                || clip.source_out < clip.source_in
                || clip.source_out > source.duration + TIME_EPSILON
            {
                return Err(range(format!(
                    "source range {:.6}..{:.6}s outside 0..{:.6}s",
                    clip.source_in, clip.source_out, source.duration
                )));
            }

            let expected = clip.timeline_duration() * clip.speed;
            if (clip.source_duration() - expected).abs() > TIME_EPSILON {
                return Err(range(format!(
                    "source length {:.6}s does not match timeline length {:.6}s at speed {}",
                    clip.source_duration(),
                    clip.timeline_duration(),
                    clip.speed
                )));
            }
        }

        Ok(())
    }

    fn check_markers(edl: &EditDecisionList) -> Check {
        let total = edl.total_duration();
        for marker in edl.cut_points() {
            if !marker.position.is_finite()
                || marker.position < -TIME_EPSILON
                || marker.position > total + TIME_EPSILON
            {
                return Err(violation(
                    InvariantKind::MarkerOutOfRange,
                    format!("{} at {:.6}s outside 0..{:.6}s", marker.id, marker.position, total),
                ));
            }
        }

        Ok(())
    }

    /// Per track, covered spans plus the gaps between them must add up to
    /// the total duration within one frame
    fn check_duration(edl: &EditDecisionList) -> Check {
        let tolerance = 1.0 / edl.frame_rate() + TIME_EPSILON;
        let total = edl.total_duration();

        for track in [TrackType::Video, TrackType::Audio] {
            let mut cursor = 0.0_f64;
            let mut spans = 0.0;
            let mut gaps = 0.0;
            let mut any = false;

            for clip in edl.clips_on(track) {
                any = true;
                if clip.timeline_in > cursor {
                    gaps += clip.timeline_in - cursor;
                }
                // Overlap inside a transition counts once
                let covered_from = clip.timeline_in.max(cursor);
                if clip.timeline_out > covered_from {
                    spans += clip.timeline_out - covered_from;
                }
                cursor = cursor.max(clip.timeline_out);
            }

            if !any {
                continue;
            }

            let sum = spans + gaps;
            if (sum - total).abs() > tolerance {
                return Err(violation(
                    InvariantKind::DurationMismatch,
                    format!(
                        "{:?} track covers {:.6}s (spans {:.6}s + gaps {:.6}s), timeline is {:.6}s",
                        track, sum, spans, gaps, total
                    ),
                ));
            }
        }

        Ok(())
    }
}

fn violation(kind: InvariantKind, detail: String) -> TimelineInvariantError {
    TimelineInvariantError::new(kind, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::fixtures::three_clip_parts;
    use crate::timeline::types::{EdlParts, MarkerType, TransitionType};

    fn kind_of(parts: EdlParts) -> Option<InvariantKind> {
        TimelineValidator::validate(&EditDecisionList::from_parts(parts))
            .err()
            .map(|e| e.kind)
    }

    #[test]
    fn test_valid_timeline_passes() {
        assert_eq!(kind_of(three_clip_parts()), None);
    }

    #[test]
    fn test_bad_frame_rate_is_reported_first() {
        let mut parts = three_clip_parts();
        parts.frame_rate = 0.0;
        parts.clips.swap(0, 1);
        assert_eq!(kind_of(parts), Some(InvariantKind::InvalidHeader));
    }

    #[test]
    fn test_unsorted_clips_rejected() {
        let mut parts = three_clip_parts();
        parts.clips.swap(1, 2);
        assert_eq!(kind_of(parts), Some(InvariantKind::ClipOrder));
    }

    #[test]
    fn test_duplicate_clip_id_rejected() {
        let mut parts = three_clip_parts();
        parts.clips[2].id = "clip-001".to_string();
        assert_eq!(kind_of(parts), Some(InvariantKind::DuplicateClipId));
    }

    #[test]
    fn test_empty_span_rejected() {
        let mut parts = three_clip_parts();
        parts.clips[0].timeline_out = parts.clips[0].timeline_in;
        assert_eq!(kind_of(parts), Some(InvariantKind::ClipSpan));
    }

    #[test]
    fn test_overlap_bounded_by_transition() {
        // clip-001 -> clip-002 carries a 0.5s dissolve
        let mut parts = three_clip_parts();
        parts.clips[0].timeline_out += 0.4;
        parts.clips[0].source_out += 0.4;
        assert_ne!(kind_of(parts), Some(InvariantKind::ClipOverlap));

        let mut parts = three_clip_parts();
        parts.clips[0].timeline_out += 0.6;
        parts.clips[0].source_out += 0.6;
        assert_eq!(kind_of(parts), Some(InvariantKind::ClipOverlap));

        // clip-002 -> clip-003 is a cut, so no overlap at all
        let mut parts = three_clip_parts();
        parts.clips[1].timeline_out += 0.1;
        parts.clips[1].source_out += 0.1;
        assert_eq!(kind_of(parts), Some(InvariantKind::ClipOverlap));
    }

    #[test]
    fn test_dangling_transition_rejected() {
        let mut parts = three_clip_parts();
        parts.transitions[0].incoming_clip_id = "clip-404".to_string();
        assert_eq!(kind_of(parts), Some(InvariantKind::DanglingTransition));
    }

    #[test]
    fn test_transition_geometry() {
        let mut parts = three_clip_parts();
        parts.transitions[0].center_point = 1.5;
        assert_eq!(kind_of(parts), Some(InvariantKind::TransitionGeometry));

        let mut parts = three_clip_parts();
        parts.transitions[1].duration = 0.5;
        assert_eq!(parts.transitions[1].kind, TransitionType::Cut);
        assert_eq!(kind_of(parts), Some(InvariantKind::TransitionGeometry));

        // clip-002 starts 2s into its source, so a 3s dissolve has no head
        let mut parts = three_clip_parts();
        parts.transitions[0].duration = 3.0;
        assert_eq!(kind_of(parts), Some(InvariantKind::TransitionGeometry));
    }

    #[test]
    fn test_source_range_violations() {
        let mut parts = three_clip_parts();
        parts.clips[2].source_id = "zzz".to_string();
        assert_eq!(kind_of(parts), Some(InvariantKind::UnknownSource));

        let mut parts = three_clip_parts();
        parts.clips[2].source_in = 9.0;
        parts.clips[2].source_out = 11.0;
        assert_eq!(kind_of(parts), Some(InvariantKind::SourceRange));

        let mut parts = three_clip_parts();
        parts.clips[2].source_out += 0.25;
        assert_eq!(kind_of(parts), Some(InvariantKind::SourceRange));

        // Half speed: 2s of timeline plays 1s of source
        let mut parts = three_clip_parts();
        parts.clips[2].speed = 0.5;
        parts.clips[2].source_out = parts.clips[2].source_in + 1.0;
        assert_eq!(kind_of(parts), None);
    }

    #[test]
    fn test_marker_outside_timeline_rejected() {
        let mut parts = three_clip_parts();
        let last = parts.cut_points.len() - 1;
        assert_eq!(parts.cut_points[last].kind, MarkerType::Out);
        parts.cut_points[last].position = parts.total_duration + 0.5;
        assert_eq!(kind_of(parts), Some(InvariantKind::MarkerOutOfRange));
    }

    #[test]
    fn test_duration_conservation_within_one_frame() {
        let mut parts = three_clip_parts();
        parts.total_duration += 0.5 / 30.0;
        assert_eq!(kind_of(parts), None);

        let mut parts = three_clip_parts();
        parts.total_duration += 2.0 / 30.0;
        assert_eq!(kind_of(parts), Some(InvariantKind::DurationMismatch));
    }

    #[test]
    fn test_interior_gap_counts_toward_duration() {
        let mut parts = three_clip_parts();
        parts.clips[1].timeline_out -= 0.5;
        parts.clips[1].source_out -= 0.5;
        parts.transitions[1].kind = TransitionType::Cut;
        assert_eq!(kind_of(parts), None);
    }
}
