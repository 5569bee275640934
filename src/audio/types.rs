use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Energy level assumed for stretches of audio no energy segment covers
pub const NEUTRAL_ENERGY: f64 = 0.5;

/// Beat and energy analysis of the soundtrack, as produced by the external
/// audio analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAnalysis {
    /// Detected beats, in time order
    pub beats: Vec<Beat>,

    /// Energy level over time, in time order
    #[serde(default, alias = "energy_segments")]
    pub energy_segments: Vec<EnergySegment>,

    /// Overall tempo (BPM)
    #[serde(default)]
    pub tempo: f64,

    /// Track length in seconds, when the analyzer reports it
    #[serde(default, alias = "total_duration", alias = "duration")]
    pub total_duration: Option<f64>,
}

/// Individual beat detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    /// Time of the beat in seconds
    pub time: f64,

    /// Salience of the beat (0.0-1.0)
    pub strength: f64,
}

/// Energy level over a span of the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySegment {
    /// Start time in seconds
    pub start: f64,

    /// Length in seconds
    pub duration: f64,

    /// Normalized loudness/energy (0.0-1.0)
    pub level: f64,
}

impl EnergySegment {
    /// End time in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

impl AudioAnalysis {
    /// Total track length in seconds.
    ///
    /// Falls back to the last beat or the end of the last energy segment when
    /// the analyzer did not report a duration.
    pub fn duration(&self) -> f64 {
        if let Some(duration) = self.total_duration {
            return duration;
        }

        let last_beat = self.beats.last().map(|b| b.time).unwrap_or(0.0);
        let last_energy = self
            .energy_segments
            .last()
            .map(EnergySegment::end)
            .unwrap_or(0.0);
        last_beat.max(last_energy)
    }

    /// Time-weighted mean energy over `[start, end)`
    pub fn energy_level_in(&self, start: f64, end: f64) -> f64 {
        let mut weighted = 0.0;
        let mut covered = 0.0;

        for segment in &self.energy_segments {
            let overlap = segment.end().min(end) - segment.start.max(start);
            if overlap > 0.0 {
                weighted += segment.level * overlap;
                covered += overlap;
            }
        }

        if covered > 0.0 {
            weighted / covered
        } else {
            NEUTRAL_ENERGY
        }
    }

    /// Check the analysis is usable for edit generation
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.beats.is_empty() {
            return Err(AnalysisError::NoBeats);
        }

        let mut previous = 0.0;
        for (index, beat) in self.beats.iter().enumerate() {
            if !beat.time.is_finite() || beat.time < 0.0 {
                return Err(AnalysisError::InvalidBeat {
                    index,
                    reason: format!("time {} is not a non-negative number", beat.time),
                });
            }
            if !(0.0..=1.0).contains(&beat.strength) {
                return Err(AnalysisError::InvalidBeat {
                    index,
                    reason: format!("strength {} outside 0..1", beat.strength),
                });
            }
            if beat.time < previous {
                return Err(AnalysisError::InvalidBeat {
                    index,
                    reason: format!("time {:.3}s precedes previous beat at {:.3}s", beat.time, previous),
                });
            }
            previous = beat.time;
        }

        let mut previous_start = 0.0;
        for (index, segment) in self.energy_segments.iter().enumerate() {
            if !segment.start.is_finite() || !segment.duration.is_finite() || segment.duration < 0.0 {
                return Err(AnalysisError::InvalidEnergySegment {
                    index,
                    reason: "start and duration must be finite, duration non-negative".to_string(),
                });
            }
            if !(0.0..=1.0).contains(&segment.level) {
                return Err(AnalysisError::InvalidEnergySegment {
                    index,
                    reason: format!("level {} outside 0..1", segment.level),
                });
            }
            if segment.start < previous_start {
                return Err(AnalysisError::InvalidEnergySegment {
                    index,
                    reason: "segments are not in time order".to_string(),
                });
            }
            previous_start = segment.start;
        }

        if !self.tempo.is_finite() || self.tempo < 0.0 {
            return Err(AnalysisError::InvalidAudio {
                reason: format!("tempo {} is not a non-negative number", self.tempo),
            });
        }

        let duration = self.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return Err(AnalysisError::InvalidAudio {
                reason: format!("duration {} must be positive", duration),
            });
        }

        Ok(())
    }
}
