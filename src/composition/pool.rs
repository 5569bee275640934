//! Bookkeeping of which scene material has been placed on the timeline.

use crate::timecode::FrameRate;
use crate::video::{Scene, VideoAnalysis, SCENE_EPSILON};

#[derive(Debug, Clone)]
struct SceneSlot {
    scene: Scene,

    /// Seconds already placed, counted from `scene.start`
    consumed: f64,
}

impl SceneSlot {
    fn remaining(&self) -> f64 {
        (self.scene.duration() - self.consumed).max(0.0)
    }
}

/// A scene that still has at least one frame of unused material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub video: usize,
    pub scene: usize,

    /// Unused seconds in the scene itself
    pub remaining: f64,

    /// Unused seconds reachable by running on into following scenes
    pub run: f64,
}

/// Per-scene consumption and per-clip usage for one generation run
#[derive(Debug)]
pub struct ScenePool<'a> {
    videos: &'a [VideoAnalysis],
    slots: Vec<Vec<SceneSlot>>,
    last_used: Vec<Option<usize>>,
    rate: FrameRate,
    passes: usize,
}

impl<'a> ScenePool<'a> {
    pub fn new(videos: &'a [VideoAnalysis], rate: FrameRate) -> Self {
        let slots = videos
            .iter()
            .map(|video| {
                video
                    .effective_scenes()
                    .into_iter()
                    .map(|scene| SceneSlot { scene, consumed: 0.0 })
                    .collect()
            })
            .collect();

        Self {
            videos,
            slots,
            last_used: vec![None; videos.len()],
            rate,
            passes: 1,
        }
    }

    pub fn video(&self, video: usize) -> &'a VideoAnalysis {
        &self.videos[video]
    }

    pub fn scene(&self, video: usize, scene: usize) -> &Scene {
        &self.slots[video][scene].scene
    }

    /// Every scene with at least one whole frame left
    pub fn candidates(&self) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for (video, scenes) in self.slots.iter().enumerate() {
            for (scene, slot) in scenes.iter().enumerate() {
                let remaining = slot.remaining();
                if self.rate.seconds_to_frames(remaining) >= 1 {
                    candidates.push(Candidate {
                        video,
                        scene,
                        remaining,
                        run: self.run_available(video, scene),
                    });
                }
            }
        }
        candidates
    }

    /// Unused material from a scene onward, following contiguous untouched
    /// scenes of the same clip
    pub fn run_available(&self, video: usize, scene: usize) -> f64 {
        let scenes = &self.slots[video];
        let mut run = scenes[scene].remaining();

        for next in scene + 1..scenes.len() {
            let previous = &scenes[next - 1].scene;
            let slot = &scenes[next];
            if slot.scene.start - previous.end > SCENE_EPSILON || slot.consumed > 0.0 {
                break;
            }
            run += slot.remaining();
        }

        run
    }

    /// Source time where the next placement from this scene starts
    pub fn source_position(&self, video: usize, scene: usize) -> f64 {
        let slot = &self.slots[video][scene];
        slot.scene.start + slot.consumed
    }

    /// Mark `amount` seconds as placed, spilling into following scenes
    pub fn consume(&mut self, video: usize, scene: usize, amount: f64) {
        let mut left = amount;
        for slot in self.slots[video].iter_mut().skip(scene) {
            let take = left.min(slot.remaining());
            slot.consumed += take;
            left -= take;
            if left <= SCENE_EPSILON {
                break;
            }
        }
    }

    pub fn mark_used(&mut self, video: usize, interval: usize) {
        self.last_used[video] = Some(interval);
    }

    pub fn last_used(&self, video: usize) -> Option<usize> {
        self.last_used[video]
    }

    /// Start another pass over all material. Usage history is kept so the
    /// variety bonus still favours least recently used clips.
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.consumed = 0.0;
        }
        self.passes += 1;
    }

    /// Number of passes made over the material, starting at 1
    pub fn passes(&self) -> usize {
        self.passes
    }
}
