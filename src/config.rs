use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for beatcut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name written into every exported sequence
    pub project_name: String,

    /// Editing style settings
    pub style: StyleConfig,

    /// Candidate scoring weights
    pub scoring: ScoringWeights,

    /// Export settings
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_name: "Untitled Edit".to_string(),
            style: StyleConfig::default(),
            scoring: ScoringWeights::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "project_name".to_string(),
                value: self.project_name.clone(),
            }.into());
        }

        self.style.validate()?;
        self.scoring.validate()?;
        self.export.validate()?;
        Ok(())
    }
}

/// How transitions may be softened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPreference {
    /// Use the selector's rule table as is
    #[default]
    Auto,

    /// Hard cuts everywhere
    #[serde(alias = "cutsOnly", alias = "cuts-only")]
    CutsOnly,

    /// Soft transitions are always dissolves
    Dissolve,

    /// Soft transitions are always wipes
    Wipe,
}

/// Editing style configuration
///
/// Keys may be written in snake_case or in the camelCase used by the
/// analysis front-end; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Musical genre, informational once presets are applied
    pub genre: String,

    /// Name of a registered editing style (dynamic, smooth, mixed, cinematic)
    pub style: String,

    /// Override for the kind of soft transitions
    #[serde(alias = "transitionPreference")]
    pub transition_preference: TransitionPreference,

    /// Shortest interval between two cut points (seconds)
    #[serde(alias = "minClipDuration")]
    pub min_clip_duration: f64,

    /// Beats must be strictly stronger than this to become cut points (0.0-1.0)
    #[serde(alias = "beatThreshold")]
    pub beat_threshold: f64,

    /// Number of intervals a clip stays "recently used"
    #[serde(alias = "varietyWindow")]
    pub variety_window: usize,

    /// Reuse footage round-robin when the song outlasts it
    #[serde(alias = "allowLoop")]
    pub allow_loop: bool,

    /// Timeline frame rate (frames per second)
    #[serde(alias = "frameRate")]
    pub frame_rate: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            genre: "pop".to_string(),
            style: "smooth".to_string(),
            transition_preference: TransitionPreference::Auto,
            min_clip_duration: 0.5,
            beat_threshold: 0.2,
            variety_window: 3,
            allow_loop: true,
            frame_rate: 30.0,
        }
    }
}

impl StyleConfig {
    /// Preset tuned for a musical genre
    ///
    /// Fast genres cut hard on strong beats, slow genres hold shots and
    /// favour dissolves. Unknown genres get the defaults.
    pub fn for_genre(genre: &str) -> Self {
        let normalized = genre.trim().to_lowercase();
        let base = Self {
            genre: normalized.clone(),
            ..Self::default()
        };

        match normalized.as_str() {
            "electronic" | "edm" | "techno" | "house" | "drum-and-bass" | "hip-hop" | "hiphop" | "rap" => Self {
                style: "dynamic".to_string(),
                min_clip_duration: 0.4,
                beat_threshold: 0.5,
                variety_window: 4,
                ..base
            },
            "rock" | "pop" | "indie" | "punk" => Self {
                style: "mixed".to_string(),
                min_clip_duration: 0.75,
                beat_threshold: 0.4,
                ..base
            },
            "ambient" | "classical" | "jazz" | "acoustic" | "folk" => Self {
                style: "smooth".to_string(),
                min_clip_duration: 1.5,
                beat_threshold: 0.3,
                variety_window: 2,
                ..base
            },
            "soundtrack" | "orchestral" => Self {
                style: "cinematic".to_string(),
                min_clip_duration: 2.0,
                beat_threshold: 0.35,
                ..base
            },
            _ => base,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.min_clip_duration.is_finite() || self.min_clip_duration <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "style.min_clip_duration".to_string(),
                value: self.min_clip_duration.to_string()
            }.into());
        }

        if !(0.0..=1.0).contains(&self.beat_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "style.beat_threshold".to_string(),
                value: self.beat_threshold.to_string()
            }.into());
        }

        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 || self.frame_rate > 240.0 {
            return Err(ConfigError::InvalidValue {
                key: "style.frame_rate".to_string(),
                value: self.frame_rate.to_string()
            }.into());
        }

        if self.style.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "style.style".to_string(),
                value: self.style.clone()
            }.into());
        }

        Ok(())
    }
}

/// Weights of the four candidate scoring terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// How well the scene length fits the interval
    pub duration_fit: f64,

    /// How well the content type suits the style
    pub content_match: f64,

    /// Bonus for clips not seen recently
    pub variety: f64,

    /// How well scene motion follows the music's energy
    pub motion_energy: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            duration_fit: 0.3,
            content_match: 0.25,
            variety: 0.25,
            motion_energy: 0.2,
        }
    }
}

impl ScoringWeights {
    fn validate(&self) -> Result<()> {
        let weights = [
            ("scoring.duration_fit", self.duration_fit),
            ("scoring.content_match", self.content_match),
            ("scoring.variety", self.variety),
            ("scoring.motion_energy", self.motion_energy),
        ];

        for (key, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string()
                }.into());
            }
        }

        if weights.iter().map(|(_, w)| w).sum::<f64>() <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "scoring".to_string(),
                value: "all weights are zero".to_string()
            }.into());
        }

        Ok(())
    }
}

/// Export settings shared by the XML writers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// `version` attribute of the fcpxml root
    pub fcpx_version: String,

    /// Sequence frame width in pixels
    pub width: u32,

    /// Sequence frame height in pixels
    pub height: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fcpx_version: "1.9".to_string(),
            width: 1920,
            height: 1080,
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<()> {
        let version_ok = match self.fcpx_version.split_once('.') {
            Some((major, minor)) => major == "1" && minor.parse::<u32>().is_ok(),
            None => false,
        };
        if !version_ok {
            return Err(ConfigError::InvalidValue {
                key: "export.fcpx_version".to_string(),
                value: self.fcpx_version.clone()
            }.into());
        }

        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "export.resolution".to_string(),
                value: format!("{}x{}", self.width, self.height)
            }.into());
        }

        Ok(())
    }
}
