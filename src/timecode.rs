//! # Frame Rates and Timecode
//!
//! Frame-grid arithmetic shared by the engine, the validator and the exporters.
//! Seconds are converted to frames by rounding *down*, so an exported in/out
//! point can never land past the source material it came from.

use std::fmt;

/// Slack (in frames) absorbed before flooring, so that `0.5333… * 30`
/// still counts as frame 16 and not 15.
pub const FRAME_EPSILON: f64 = 1e-6;

/// NTSC rates as (nominal, timebase)
const NTSC_RATES: [(f64, u32); 3] = [(23.976, 24), (29.97, 30), (59.94, 60)];

/// A video frame rate with helpers for frame/timecode conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRate {
    fps: f64,
    ntsc: bool,
}

impl FrameRate {
    /// Create a frame rate, normalizing 23.976/29.97/59.94 to their exact
    /// 1000/1001 values
    pub fn from_fps(fps: f64) -> Self {
        for (nominal, timebase) in NTSC_RATES {
            if (fps - nominal).abs() < 0.01 {
                return Self {
                    fps: timebase as f64 * 1000.0 / 1001.0,
                    ntsc: true,
                };
            }
        }
        Self { fps, ntsc: false }
    }

    /// Frames per second
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Whether this is a 1000/1001 NTSC rate
    pub fn is_ntsc(&self) -> bool {
        self.ntsc
    }

    /// Integer frames-per-second label used in timecodes
    pub fn timebase(&self) -> u32 {
        (self.fps.round() as u32).max(1)
    }

    /// Length of one frame in seconds
    pub fn frame_duration(&self) -> f64 {
        1.0 / self.fps
    }

    /// Convert seconds to whole frames, rounding down
    pub fn seconds_to_frames(&self, seconds: f64) -> i64 {
        (seconds * self.fps + FRAME_EPSILON).floor() as i64
    }

    /// Convert seconds to whole frames, rounding to the nearest frame
    pub fn seconds_to_frames_nearest(&self, seconds: f64) -> i64 {
        (seconds * self.fps).round() as i64
    }

    /// Convert a frame count back to seconds
    pub fn frames_to_seconds(&self, frames: i64) -> f64 {
        frames as f64 / self.fps
    }

    /// Move a time down onto the frame grid
    pub fn snap_down(&self, seconds: f64) -> f64 {
        self.frames_to_seconds(self.seconds_to_frames(seconds))
    }

    /// Move a time onto the nearest frame boundary
    pub fn snap_nearest(&self, seconds: f64) -> f64 {
        self.frames_to_seconds(self.seconds_to_frames_nearest(seconds))
    }

    /// Frame duration as a rational `(numerator, denominator)` in seconds
    pub fn rational_frame_duration(&self) -> (u64, u64) {
        if self.ntsc {
            (1001, self.timebase() as u64 * 1000)
        } else if (self.fps - self.fps.round()).abs() < 1e-9 {
            (1, self.timebase() as u64)
        } else {
            (100, (self.fps * 100.0).round() as u64)
        }
    }

    /// Format a frame count as non-drop-frame `HH:MM:SS:FF`
    pub fn timecode(&self, frames: i64) -> String {
        let timebase = self.timebase() as i64;
        let frames = frames.max(0);
        let ff = frames % timebase;
        let total_seconds = frames / timebase;
        let ss = total_seconds % 60;
        let mm = (total_seconds / 60) % 60;
        let hh = total_seconds / 3600;
        format!("{:02}:{:02}:{:02}:{:02}", hh, mm, ss, ff)
    }

    /// Parse a `HH:MM:SS:FF` (or `HH:MM:SS;FF`) timecode into a frame count
    pub fn parse_timecode(&self, timecode: &str) -> Option<i64> {
        let parts: Vec<&str> = timecode.trim().split([':', ';']).collect();
        if parts.len() != 4 {
            return None;
        }

        let mut values = [0i64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().ok()?;
        }

        let [hh, mm, ss, ff] = values;
        let timebase = self.timebase() as i64;
        if mm >= 60 || ss >= 60 || ff >= timebase {
            return None;
        }

        Some(((hh * 60 + mm) * 60 + ss) * timebase + ff)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ntsc {
            write!(f, "{:.3} fps (NTSC)", self.fps)
        } else {
            write!(f, "{} fps", self.fps)
        }
    }
}
