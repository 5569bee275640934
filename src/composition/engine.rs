use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    audio::AudioAnalysis,
    composition::{
        cancel::CancelToken,
        pool::{Candidate, ScenePool},
        scoring::{self, ScoreBreakdown},
        transition::{content_continuity, ShotInfo, TransitionSelector, HARD_CUT_STRENGTH},
    },
    config::Config,
    error::{AnalysisError, InsufficientMediaError, Result},
    styles::{EditStyle, StyleRegistry},
    timecode::FrameRate,
    timeline::{
        EditDecisionList, EdlParts, Marker, MarkerType, MatchedClip, SourceMedia, TimelineValidator,
        TrackType, Transition, TIME_EPSILON,
    },
    video::{validate_video_set, ContentType, VideoAnalysis},
};

/// The cancel token is polled once per this many intervals
pub const CANCEL_CHECK_INTERVAL: usize = 256;

/// Tolerance when deciding whether a run of material covers an interval
const FIT_EPSILON: f64 = 1e-9;

/// Strength given to cuts the engine inserts inside an interval
const HARD_CUT: f64 = 1.0;

/// A point where the edit changes shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CutPoint {
    /// Seconds, on the frame grid
    pub time: f64,

    /// Strength of the beat that produced the cut
    pub strength: f64,
}

/// Non-fatal problems reported next to a generated edit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditWarning {
    /// Footage ran out and was reused from the start
    MediaLooped {
        passes: usize,
        available: f64,
        required: f64,
    },

    /// Footage ran out and the edit stops early
    InsufficientMedia(InsufficientMediaError),
}

impl fmt::Display for EditWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MediaLooped {
                passes,
                available,
                required,
            } => write!(
                f,
                "footage reused: {:.2}s of unique footage played {} times to cover {:.2}s of audio",
                available, passes, required
            ),
            Self::InsufficientMedia(e) => write!(f, "edit truncated: {}", e),
        }
    }
}

/// Result of a generation run: a validated edit plus any warnings
#[derive(Debug, Clone)]
pub struct GeneratedEdit {
    pub edl: EditDecisionList,
    pub warnings: Vec<EditWarning>,
}

/// A clip placed by the assignment step, with what transitions need to know
#[derive(Debug, Clone)]
struct Placement {
    clip: MatchedClip,
    content_type: ContentType,
    motion_intensity: f64,

    /// Beat strength of the cut at the clip's in point
    cut_strength: f64,

    /// Interval the clip was placed in
    interval: usize,
}

#[derive(Debug, Clone, Copy)]
struct RankedCandidate {
    candidate: Candidate,
    score: f64,
    breakdown: ScoreBreakdown,
    recent: bool,
}

/// Outcome of the assignment step
struct Assignment {
    placements: Vec<Placement>,
    end: f64,
    passes: usize,
    truncated: bool,
}

/// Turns audio and video analysis into an edit decision list
///
/// Generation follows a fixed pipeline:
/// 1. Cut points - strong beats, spaced at least the minimum clip length apart
/// 2. Assignment - score every scene with material left against each interval
/// 3. Transitions - pick and fit a transition at each internal cut
/// 4. Assembly - clips, transitions and markers, checked by the validator
///
/// The engine performs no I/O and identical inputs always produce the same
/// edit.
pub struct EditDecisionEngine {
    config: Config,
    style: Box<dyn EditStyle>,
}

impl EditDecisionEngine {
    /// Create an engine with an explicit style
    pub fn new(config: Config, style: Box<dyn EditStyle>) -> Self {
        Self { config, style }
    }

    /// Create an engine using the style named in the configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let style = StyleRegistry::new().resolve(&config.style.style)?;
        Ok(Self::new(config, style))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn style(&self) -> &dyn EditStyle {
        self.style.as_ref()
    }

    fn rate(&self) -> FrameRate {
        FrameRate::from_fps(self.config.style.frame_rate)
    }

    /// Generate an edit decision list
    pub fn generate(&self, audio: &AudioAnalysis, videos: &[VideoAnalysis]) -> Result<GeneratedEdit> {
        self.generate_with_cancel(audio, videos, &CancelToken::new())
    }

    /// Generate an edit decision list, polling `cancel` during assignment
    pub fn generate_with_cancel(
        &self,
        audio: &AudioAnalysis,
        videos: &[VideoAnalysis],
        cancel: &CancelToken,
    ) -> Result<GeneratedEdit> {
        info!("🎬 Generating edit '{}'", self.config.project_name);
        info!("   Style: {}", self.style.name());

        self.config.validate()?;
        validate_video_set(videos)?;
        audio.validate()?;

        let rate = self.rate();
        debug!("   Frame rate: {}", rate);

        // Step 1: Cut points
        let cuts = self.cut_points(audio)?;
        let required = cuts.last().map(|c| c.time).unwrap_or(0.0);
        info!("🥁 Step 1: {} cut points over {:.2}s", cuts.len(), required);

        // Step 2: Interval-to-clip assignment
        let assignment = self.assign_clips(audio, videos, &cuts, cancel)?;
        info!(
            "🎞️  Step 2: {} clips placed, timeline ends at {:.2}s",
            assignment.placements.len(),
            assignment.end
        );

        let mut warnings = Vec::new();
        let available: f64 = videos.iter().map(VideoAnalysis::unique_duration).sum();
        if assignment.passes > 1 {
            let warning = EditWarning::MediaLooped {
                passes: assignment.passes,
                available,
                required,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
        if assignment.truncated {
            let warning = EditWarning::InsufficientMedia(InsufficientMediaError { available, required });
            warn!("{}", warning);
            warnings.push(warning);
        }

        // Step 3: Transitions
        let transitions = self.assign_transitions(&assignment.placements, videos);
        let soft = transitions.iter().filter(|t| !t.kind.is_cut()).count();
        info!("✂️  Step 3: {} transitions ({} soft)", transitions.len(), soft);

        // Step 4: Assembly
        let markers = self.build_markers(&cuts, assignment.end);
        let sources = referenced_sources(videos, &assignment.placements);

        let edl = EditDecisionList::from_parts(EdlParts {
            project_name: self.config.project_name.clone(),
            frame_rate: self.config.style.frame_rate,
            total_duration: assignment.end,
            sources,
            clips: assignment.placements.into_iter().map(|p| p.clip).collect(),
            transitions,
            cut_points: markers,
        });

        TimelineValidator::validate(&edl)?;
        info!("✅ Step 4: edit assembled and validated");

        Ok(GeneratedEdit { edl, warnings })
    }

    // ==========================================
    // STEP 1: CUT POINTS
    // ==========================================

    /// Select cut points from the beat grid.
    ///
    /// The first cut is at 0 and the last at the track's end, rounded to the
    /// nearest frame. In between, a beat becomes a cut when it is stronger
    /// than the threshold and at least the minimum clip length after the
    /// previous cut.
    pub fn cut_points(&self, audio: &AudioAnalysis) -> Result<Vec<CutPoint>> {
        let rate = self.rate();
        let style = &self.config.style;
        let total = rate.snap_nearest(audio.duration());

        if total < rate.frame_duration() - TIME_EPSILON {
            return Err(AnalysisError::InvalidAudio {
                reason: format!("duration {:.4}s is shorter than one frame", audio.duration()),
            }
            .into());
        }

        let mut cuts = vec![CutPoint {
            time: 0.0,
            strength: HARD_CUT,
        }];
        let mut last = 0.0;

        for beat in &audio.beats {
            if beat.strength <= style.beat_threshold {
                continue;
            }

            let time = rate.snap_down(beat.time);
            if time <= last + TIME_EPSILON || time - last < style.min_clip_duration - FIT_EPSILON {
                continue;
            }
            // A beat on the end would leave an empty last interval
            if total - time <= TIME_EPSILON {
                continue;
            }

            debug!("Cut at {:.3}s (beat strength {:.2})", time, beat.strength);
            cuts.push(CutPoint {
                time,
                strength: beat.strength,
            });
            last = time;
        }

        cuts.push(CutPoint {
            time: total,
            strength: HARD_CUT,
        });
        Ok(cuts)
    }

    // ==========================================
    // STEP 2: ASSIGNMENT
    // ==========================================

    fn assign_clips(
        &self,
        audio: &AudioAnalysis,
        videos: &[VideoAnalysis],
        cuts: &[CutPoint],
        cancel: &CancelToken,
    ) -> Result<Assignment> {
        let rate = self.rate();
        let mut pool = ScenePool::new(videos, rate);

        if pool.candidates().is_empty() {
            return Err(AnalysisError::NoUsableMedia.into());
        }

        let mut placements: Vec<Placement> = Vec::new();
        let mut end = cuts.last().map(|c| c.time).unwrap_or(0.0);
        let mut truncated = false;

        'intervals: for (interval, window) in cuts.windows(2).enumerate() {
            if interval % CANCEL_CHECK_INTERVAL == 0 {
                cancel.check("clip assignment")?;
            }

            let (start, stop) = (window[0].time, window[1].time);
            let energy = audio.energy_level_in(start, stop);
            let mut cursor = start;
            let mut cut_strength = window[0].strength;
            let mut fresh_pass = false;

            while stop - cursor > TIME_EPSILON {
                let needed = stop - cursor;
                let ranked = self.rank_candidates(&pool, interval, needed, energy);

                let Some(best) = ranked.first().copied() else {
                    if self.config.style.allow_loop && !fresh_pass {
                        pool.reset();
                        fresh_pass = true;
                        debug!("Footage exhausted at {:.3}s, starting pass {}", cursor, pool.passes());
                        continue;
                    }
                    end = cursor;
                    truncated = true;
                    break 'intervals;
                };
                fresh_pass = false;

                // First candidate able to cover the rest of the interval,
                // otherwise the best one covers what it can
                let (chosen, timeline_out) = match ranked
                    .iter()
                    .find(|r| r.candidate.run >= needed - FIT_EPSILON)
                {
                    Some(full) => (*full, stop),
                    None => (best, cursor + rate.snap_down(best.candidate.run)),
                };

                let Candidate { video, scene, .. } = chosen.candidate;
                let source_in = pool.source_position(video, scene);
                let length = timeline_out - cursor;
                let details = *pool.scene(video, scene);
                let clip_id = &pool.video(video).clip_id;

                debug!(
                    "Interval {} [{:.3}s, {:.3}s): {} scene {} (score {:.3}, {:?})",
                    interval, cursor, timeline_out, clip_id, scene, chosen.score, chosen.breakdown
                );

                placements.push(Placement {
                    clip: MatchedClip {
                        id: format!("clip-{:03}", placements.len() + 1),
                        source_id: clip_id.clone(),
                        track_type: TrackType::Video,
                        timeline_in: cursor,
                        timeline_out,
                        source_in,
                        source_out: source_in + length,
                        speed: 1.0,
                        enabled: true,
                    },
                    content_type: details.content_type,
                    motion_intensity: details.motion_intensity,
                    cut_strength,
                    interval,
                });

                pool.consume(video, scene, length);
                pool.mark_used(video, interval);
                cursor = timeline_out;
                cut_strength = HARD_CUT;
            }
        }

        Ok(Assignment {
            placements,
            end,
            passes: pool.passes(),
            truncated,
        })
    }

    /// Score every candidate against an interval, best first.
    ///
    /// Equal scores fall back to clips outside the variety window, then the
    /// lowest clip id, then the lowest scene index.
    fn rank_candidates(
        &self,
        pool: &ScenePool<'_>,
        interval: usize,
        needed: f64,
        energy: f64,
    ) -> Vec<RankedCandidate> {
        let window = self.config.style.variety_window;
        let weights = &self.config.scoring;

        let mut ranked: Vec<RankedCandidate> = pool
            .candidates()
            .into_iter()
            .map(|candidate| {
                let scene = pool.scene(candidate.video, candidate.scene);
                let last_used = pool.last_used(candidate.video);
                let breakdown = ScoreBreakdown {
                    duration_fit: scoring::duration_fit(candidate.remaining, needed),
                    content_match: self.style.content_match(scene.content_type, scene.confidence),
                    variety: scoring::variety_bonus(last_used, interval, window),
                    motion_energy: scoring::motion_energy_match(scene.motion_intensity, energy),
                };
                RankedCandidate {
                    candidate,
                    score: breakdown.weighted(weights),
                    breakdown,
                    recent: scoring::recently_used(last_used, interval, window),
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            scoring::score_key(b.score)
                .cmp(&scoring::score_key(a.score))
                .then(a.recent.cmp(&b.recent))
                .then_with(|| {
                    pool.video(a.candidate.video)
                        .clip_id
                        .cmp(&pool.video(b.candidate.video).clip_id)
                })
                .then(a.candidate.scene.cmp(&b.candidate.scene))
        });
        ranked
    }

    // ==========================================
    // STEP 3: TRANSITIONS
    // ==========================================

    fn assign_transitions(&self, placements: &[Placement], videos: &[VideoAnalysis]) -> Vec<Transition> {
        let rate = self.rate();
        let selector = TransitionSelector::new(self.style.kind(), self.config.style.transition_preference);

        placements
            .windows(2)
            .enumerate()
            .map(|(index, pair)| {
                let (outgoing, incoming) = (&pair[0], &pair[1]);
                let continuity = content_continuity(
                    &ShotInfo {
                        clip: &outgoing.clip,
                        content_type: outgoing.content_type,
                        motion_intensity: outgoing.motion_intensity,
                    },
                    &ShotInfo {
                        clip: &incoming.clip,
                        content_type: incoming.content_type,
                        motion_intensity: incoming.motion_intensity,
                    },
                );

                let requested = selector.select(incoming.cut_strength, continuity, incoming.interval);
                let source_length = videos
                    .iter()
                    .find(|v| v.clip_id == outgoing.clip.source_id)
                    .map(|v| v.duration)
                    .unwrap_or(0.0);
                let spec = requested.fitted(&outgoing.clip, &incoming.clip, source_length, rate);

                if spec != requested {
                    debug!(
                        "Transition into {} shortened from {:?} {:.3}s to {:?} {:.3}s",
                        incoming.clip.id, requested.kind, requested.duration, spec.kind, spec.duration
                    );
                }

                Transition {
                    id: format!("tr-{:03}", index + 1),
                    kind: spec.kind,
                    duration: spec.duration,
                    outgoing_clip_id: outgoing.clip.id.clone(),
                    incoming_clip_id: incoming.clip.id.clone(),
                    center_point: incoming.clip.timeline_in,
                }
            })
            .collect()
    }

    // ==========================================
    // STEP 4: ASSEMBLY
    // ==========================================

    /// One marker per cut point up to the end of the edit
    fn build_markers(&self, cuts: &[CutPoint], end: f64) -> Vec<Marker> {
        let rate = self.rate();
        let mut markers = vec![Marker {
            id: String::new(),
            kind: MarkerType::In,
            position: 0.0,
            label: "Start".to_string(),
            color: Some("green".to_string()),
        }];

        for cut in cuts.iter().skip(1) {
            if cut.time >= end - TIME_EPSILON {
                break;
            }
            let color = if cut.strength >= HARD_CUT_STRENGTH {
                "red"
            } else {
                "blue"
            };
            markers.push(Marker {
                id: String::new(),
                kind: MarkerType::Marker,
                position: cut.time,
                label: format!(
                    "Beat {} ({:.2})",
                    rate.timecode(rate.seconds_to_frames(cut.time)),
                    cut.strength
                ),
                color: Some(color.to_string()),
            });
        }

        markers.push(Marker {
            id: String::new(),
            kind: MarkerType::Out,
            position: end,
            label: "End".to_string(),
            color: Some("green".to_string()),
        });

        for (index, marker) in markers.iter_mut().enumerate() {
            marker.id = format!("marker-{:03}", index + 1);
        }
        markers
    }
}

/// Sources used by at least one placement, in input order
fn referenced_sources(videos: &[VideoAnalysis], placements: &[Placement]) -> Vec<SourceMedia> {
    videos
        .iter()
        .filter(|v| placements.iter().any(|p| p.clip.source_id == v.clip_id))
        .map(|v| SourceMedia {
            id: v.clip_id.clone(),
            duration: v.duration,
            path: v.path.clone(),
        })
        .collect()
}
