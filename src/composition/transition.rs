use crate::config::TransitionPreference;
use crate::styles::StyleKind;
use crate::timeline::{MatchedClip, TransitionSpec, TransitionType, TIME_EPSILON};
use crate::video::ContentType;

/// Beats at least this strong always get a hard cut
pub const HARD_CUT_STRENGTH: f64 = 0.8;

/// Below this continuity a smooth style dissolves between shots
pub const LOW_CONTINUITY: f64 = 0.3;

const SMOOTH_DISSOLVE: f64 = 1.0;
const MIXED_TRANSITION: f64 = 0.5;

/// What the engine knows about one side of a cut when scoring continuity
#[derive(Debug, Clone, Copy)]
pub struct ShotInfo<'a> {
    pub clip: &'a MatchedClip,
    pub content_type: ContentType,
    pub motion_intensity: f64,
}

/// How naturally the incoming shot follows the outgoing one (0.0-1.0).
///
/// An incoming clip that picks up the outgoing source where it stopped is
/// fully continuous. Otherwise half comes from a shared content type and half
/// from similar motion.
pub fn content_continuity(outgoing: &ShotInfo<'_>, incoming: &ShotInfo<'_>) -> f64 {
    if outgoing.clip.source_id == incoming.clip.source_id
        && (incoming.clip.source_in - outgoing.clip.source_out).abs() <= TIME_EPSILON
    {
        return 1.0;
    }

    let same_content = if outgoing.content_type == incoming.content_type {
        1.0
    } else {
        0.0
    };
    let motion = 1.0 - (outgoing.motion_intensity - incoming.motion_intensity).abs();
    (0.5 * same_content + 0.5 * motion).clamp(0.0, 1.0)
}

/// Picks the transition at each internal cut point.
///
/// Rules, first match wins:
/// 1. a strong beat is a cut
/// 2. a smooth style dissolves for a second between unrelated shots
/// 3. a mixed style alternates half-second dissolves and wipes
/// 4. anything else is a cut
///
/// The configured preference is applied on top of the table.
#[derive(Debug, Clone, Copy)]
pub struct TransitionSelector {
    kind: StyleKind,
    preference: TransitionPreference,
}

impl TransitionSelector {
    pub fn new(kind: StyleKind, preference: TransitionPreference) -> Self {
        Self { kind, preference }
    }

    /// Choose a transition for the cut at `cut_index` (1 for the first
    /// internal cut point)
    pub fn select(&self, beat_strength: f64, continuity: f64, cut_index: usize) -> TransitionSpec {
        let spec = self.rule_table(beat_strength, continuity, cut_index);
        self.apply_preference(spec)
    }

    fn rule_table(&self, beat_strength: f64, continuity: f64, cut_index: usize) -> TransitionSpec {
        if beat_strength >= HARD_CUT_STRENGTH {
            return TransitionSpec::cut();
        }

        match self.kind {
            StyleKind::Smooth if continuity < LOW_CONTINUITY => TransitionSpec::dissolve(SMOOTH_DISSOLVE),
            StyleKind::Mixed if cut_index % 2 == 0 => TransitionSpec::dissolve(MIXED_TRANSITION),
            StyleKind::Mixed => TransitionSpec::wipe(MIXED_TRANSITION),
            _ => TransitionSpec::cut(),
        }
    }

    fn apply_preference(&self, spec: TransitionSpec) -> TransitionSpec {
        if spec.kind.is_cut() {
            return spec;
        }

        match self.preference {
            TransitionPreference::Auto => spec,
            TransitionPreference::CutsOnly => TransitionSpec::cut(),
            TransitionPreference::Dissolve => TransitionSpec {
                kind: TransitionType::Dissolve,
                ..spec
            },
            TransitionPreference::Wipe => TransitionSpec {
                kind: TransitionType::Wipe,
                ..spec
            },
        }
    }
}
