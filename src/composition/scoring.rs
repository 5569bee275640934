use serde::Serialize;

use crate::config::ScoringWeights;

/// Scores closer than this are treated as equal when ranking
pub const SCORE_EPSILON: f64 = 1e-9;

/// The four terms of a candidate's score, each in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub duration_fit: f64,
    pub content_match: f64,
    pub variety: f64,
    pub motion_energy: f64,
}

impl ScoreBreakdown {
    /// Weighted sum of the terms
    pub fn weighted(&self, weights: &ScoringWeights) -> f64 {
        weights.duration_fit * self.duration_fit
            + weights.content_match * self.content_match
            + weights.variety * self.variety
            + weights.motion_energy * self.motion_energy
    }
}

/// How well `available` seconds of scene fit an interval of `needed` seconds.
///
/// An exact fit scores 1.0. Longer scenes keep at least 0.5 since they can
/// always cover the interval; shorter ones fall toward 0.
pub fn duration_fit(available: f64, needed: f64) -> f64 {
    if needed <= 0.0 || available <= 0.0 {
        return 0.0;
    }

    if (available - needed).abs() <= SCORE_EPSILON {
        1.0
    } else if available > needed {
        0.5 + 0.5 * needed / available
    } else {
        0.5 * available / needed
    }
}

/// Bonus for a clip not used recently.
///
/// `last_used` is the interval the clip last appeared in. A clip used in the
/// previous interval gets 0, rising linearly to 1.0 once `window` intervals
/// have passed without it.
pub fn variety_bonus(last_used: Option<usize>, interval: usize, window: usize) -> f64 {
    match last_used {
        None => 1.0,
        Some(_) if window == 0 => 1.0,
        Some(used) => {
            let idle = interval.saturating_sub(used).saturating_sub(1);
            (idle as f64 / window as f64).min(1.0)
        }
    }
}

/// Whether a clip counts as recently used for tie-breaking
pub fn recently_used(last_used: Option<usize>, interval: usize, window: usize) -> bool {
    match last_used {
        Some(used) => window > 0 && interval.saturating_sub(used) <= window,
        None => false,
    }
}

/// How well scene motion follows the music's energy
pub fn motion_energy_match(motion_intensity: f64, energy: f64) -> f64 {
    (1.0 - (motion_intensity - energy).abs()).clamp(0.0, 1.0)
}

/// Integer ranking key for a score, so that near-equal scores tie exactly
pub fn score_key(score: f64) -> i64 {
    (score / SCORE_EPSILON).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_fit_shape() {
        assert_eq!(duration_fit(2.0, 2.0), 1.0);
        assert_eq!(duration_fit(4.0, 2.0), 0.75);
        assert_eq!(duration_fit(1.0, 2.0), 0.25);
        // Any scene long enough beats any scene too short
        assert!(duration_fit(100.0, 1.0) > duration_fit(0.99, 1.0));
    }

    #[test]
    fn test_variety_window() {
        assert_eq!(variety_bonus(None, 5, 3), 1.0);
        assert_eq!(variety_bonus(Some(4), 5, 3), 0.0);
        assert!((variety_bonus(Some(3), 5, 3) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(variety_bonus(Some(0), 5, 3), 1.0);
        assert_eq!(variety_bonus(Some(4), 5, 0), 1.0);

        assert!(recently_used(Some(4), 5, 3));
        assert!(recently_used(Some(2), 5, 3));
        assert!(!recently_used(Some(1), 5, 3));
        assert!(!recently_used(None, 5, 3));
    }

    #[test]
    fn test_motion_energy_match() {
        assert_eq!(motion_energy_match(0.8, 0.8), 1.0);
        assert_eq!(motion_energy_match(0.0, 1.0), 0.0);
        assert!((motion_energy_match(0.2, 0.5) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_score_and_key() {
        let breakdown = ScoreBreakdown {
            duration_fit: 1.0,
            content_match: 0.5,
            variety: 1.0,
            motion_energy: 0.5,
        };
        let score = breakdown.weighted(&ScoringWeights::default());
        assert!((score - (0.3 + 0.125 + 0.25 + 0.1)).abs() < 1e-12);
        assert_eq!(score_key(score), score_key(score + 1e-12));
    }
}
